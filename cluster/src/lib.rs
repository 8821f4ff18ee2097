pub mod discovery;
pub mod manager;
pub mod node;
pub mod registry;
pub mod role;
pub mod types;

pub use discovery::{descriptor_exists, descriptor_stem, scan_descriptors, scan_role_dirs};
pub use manager::{Cluster, RoleDiscovery};
pub use node::NodeContainer;
pub use registry::RoleRegistry;
pub use role::{Prerequisite, Role};
pub use types::*;

use dspw_common::{ProposalError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the Salt proposal tree
pub const DEFAULT_PROPOSAL_DIR: &str = "/srv/pillar/ceph/proposals";

/// Proposal layout configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Root of the proposal tree
    pub proposal_dir: PathBuf,

    /// Cluster node descriptors, relative to `proposal_dir`
    pub cluster_dir: PathBuf,

    /// Role node descriptors, relative to each role directory
    pub role_node_dir: PathBuf,

    /// Extension of node descriptor files (without the dot)
    pub descriptor_extension: String,

    /// Minion descriptors gating the monitor role, relative to the role directory
    pub minion_dir: PathBuf,

    /// Extension of minion descriptor files (without the dot)
    pub minion_extension: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            proposal_dir: PathBuf::from(DEFAULT_PROPOSAL_DIR),
            cluster_dir: PathBuf::from("cluster-ceph/cluster"),
            role_node_dir: PathBuf::from("cluster"),
            descriptor_extension: "sls".to_string(),
            minion_dir: PathBuf::from("stack/default/ceph/minions"),
            minion_extension: "yml".to_string(),
        }
    }
}

impl ClusterConfig {
    /// Default layout rooted at `proposal_dir`
    pub fn with_proposal_dir<P: Into<PathBuf>>(proposal_dir: P) -> Self {
        Self {
            proposal_dir: proposal_dir.into(),
            ..Self::default()
        }
    }

    /// Directory holding one `<node>.sls` per cluster node
    pub fn cluster_descriptor_dir(&self) -> PathBuf {
        self.proposal_dir.join(&self.cluster_dir)
    }

    /// Directory holding one `<node>.sls` per node a role may take
    pub fn role_descriptor_dir(&self, role_dir: &Path) -> PathBuf {
        role_dir.join(&self.role_node_dir)
    }

    pub fn minion_descriptor_dir(&self, role_dir: &Path) -> PathBuf {
        role_dir.join(&self.minion_dir)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, ext) in [
            ("descriptor_extension", &self.descriptor_extension),
            ("minion_extension", &self.minion_extension),
        ] {
            if ext.is_empty() || ext.starts_with('.') || ext.contains('/') {
                return Err(ProposalError::Configuration {
                    message: format!("{} must be a bare extension, got '{}'", name, ext),
                });
            }
        }

        for (name, dir) in [
            ("cluster_dir", &self.cluster_dir),
            ("role_node_dir", &self.role_node_dir),
            ("minion_dir", &self.minion_dir),
        ] {
            if dir.is_absolute() {
                return Err(ProposalError::Configuration {
                    message: format!(
                        "{} must be relative to the proposal tree, got {}",
                        name,
                        dir.display()
                    ),
                });
            }
        }

        Ok(())
    }
}
