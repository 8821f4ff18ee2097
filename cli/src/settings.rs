//! Layered settings for the `dspw` binary.
//!
//! Sources, lowest priority first:
//!
//! | Source                     | Example                                   |
//! |----------------------------|-------------------------------------------|
//! | built-in defaults          | `proposal_dir = /srv/pillar/ceph/proposals` |
//! | `--config FILE`            | TOML, YAML or JSON, by extension          |
//! | environment                | `DSPW_LOG_LEVEL=debug`, `DSPW_CLUSTER__PROPOSAL_DIR=/tmp/p` |
//! | `--proposal-dir DIR`       |                                           |

use dspw_cluster::ClusterConfig;
use dspw_common::{ProposalError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// tracing filter used when `RUST_LOG` is unset
    pub log_level: String,

    pub cluster: ClusterConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            cluster: ClusterConfig::default(),
        }
    }
}

pub fn load_settings(file: Option<&Path>, proposal_dir: Option<&Path>) -> Result<Settings> {
    load_layered(file, environment(), proposal_dir)
}

/// `DSPW_` prefix, `__` between nested keys: `DSPW_CLUSTER__PROPOSAL_DIR`
fn environment() -> config::Environment {
    config::Environment::with_prefix("DSPW")
        .prefix_separator("_")
        .separator("__")
}

fn load_layered(
    file: Option<&Path>,
    environment: config::Environment,
    proposal_dir: Option<&Path>,
) -> Result<Settings> {
    let defaults = config::Config::try_from(&Settings::default()).map_err(config_error)?;

    let mut builder = config::Config::builder().add_source(defaults);

    if let Some(file) = file {
        builder = builder.add_source(config::File::from(file));
    }

    let settings: Settings = builder
        .add_source(environment)
        .set_override_option(
            "cluster.proposal_dir",
            proposal_dir.map(|dir| dir.to_string_lossy().into_owned()),
        )
        .map_err(config_error)?
        .build()
        .map_err(config_error)?
        .try_deserialize()
        .map_err(config_error)?;

    settings.cluster.validate()?;

    Ok(settings)
}

fn config_error(e: config::ConfigError) -> ProposalError {
    ProposalError::Configuration {
        message: e.to_string(),
    }
}
