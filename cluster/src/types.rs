use dspw_common::{ProposalError, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::path::PathBuf;
use std::str::FromStr;

/// Prefix shared by every role directory in a proposal tree
pub const ROLE_PREFIX: &str = "role-";

/// Identifier of a machine, taken from a descriptor filename stem
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();

        if id.is_empty() {
            return Err(ProposalError::InvalidNodeId {
                message: "node id is empty".to_string(),
            });
        }

        if id.contains('/') || id.contains('\0') {
            return Err(ProposalError::InvalidNodeId {
                message: format!("'{}' cannot name a descriptor file", id.escape_debug()),
            });
        }

        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NodeId {
    type Err = ProposalError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for NodeId {
    type Error = ProposalError;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Ordering of NodeId is the ordering of its string, so sets can be probed by &str.
impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Functional capability a cluster node can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoleKind {
    Admin,
    Igw,
    IgwClient,
    Master,
    Mds,
    MdsClient,
    MdsNfs,
    Mon,
    Rgw,
    RgwClient,
    RgwNfs,
    Storage,
}

impl RoleKind {
    pub const ALL: [RoleKind; 12] = [
        RoleKind::Admin,
        RoleKind::Igw,
        RoleKind::IgwClient,
        RoleKind::Master,
        RoleKind::Mds,
        RoleKind::MdsClient,
        RoleKind::MdsNfs,
        RoleKind::Mon,
        RoleKind::Rgw,
        RoleKind::RgwClient,
        RoleKind::RgwNfs,
        RoleKind::Storage,
    ];

    /// Short name, e.g. `igw-client`
    pub fn name(self) -> &'static str {
        match self {
            RoleKind::Admin => "admin",
            RoleKind::Igw => "igw",
            RoleKind::IgwClient => "igw-client",
            RoleKind::Master => "master",
            RoleKind::Mds => "mds",
            RoleKind::MdsClient => "mds-client",
            RoleKind::MdsNfs => "mds-nfs",
            RoleKind::Mon => "mon",
            RoleKind::Rgw => "rgw",
            RoleKind::RgwClient => "rgw-client",
            RoleKind::RgwNfs => "rgw-nfs",
            RoleKind::Storage => "storage",
        }
    }

    /// Directory token, e.g. `role-igw-client`
    pub fn token(self) -> String {
        format!("{}{}", ROLE_PREFIX, self.name())
    }
}

impl std::fmt::Display for RoleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", ROLE_PREFIX, self.name())
    }
}

/// Read-only view of a role, for presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSnapshot {
    pub role: RoleKind,
    pub path: PathBuf,
    pub available: Vec<NodeId>,
    pub assigned: Vec<NodeId>,
}

/// Read-only view of a cluster and its roles, for presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    pub proposal_dir: PathBuf,
    pub available: Vec<NodeId>,
    pub assigned: Vec<NodeId>,
    pub roles: Vec<RoleSnapshot>,
    pub unsupported_roles: Vec<String>,
}
