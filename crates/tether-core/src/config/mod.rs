//! Configuration management
//!
//! Two layers are supported:
//! - Global: ~/.config/tether/tether.toml
//! - Project: ./tether.toml (overrides global entries)

pub mod merge;
pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

use serde::{Deserialize, Serialize};

pub use merge::merge_configs;
pub use parser::{parse_tether_toml, parse_tether_toml_str, to_toml};
pub use paths::{CONFIG_FILE_NAME, config_path_for_scope};
pub use schema::{
    AccountEntry, ContractEntry, DeploymentContract, DeploymentEntry, KeyEntry, NetworkEntry,
    TetherConfig,
};
pub use store::{ConfigStore, load_merged};

/// Configuration scope levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigScope {
    /// User-wide configuration
    Global,
    /// Project configuration in the working directory
    Project,
}
