//! Config path resolution helpers.

use std::path::{Path, PathBuf};

use super::ConfigScope;

/// File name of every configuration layer.
pub const CONFIG_FILE_NAME: &str = "tether.toml";

pub fn config_path_for_scope(
    scope: ConfigScope,
    global_dir: &Path,
    project_root: &Path,
) -> PathBuf {
    match scope {
        ConfigScope::Global => global_dir.join(CONFIG_FILE_NAME),
        ConfigScope::Project => project_root.join(CONFIG_FILE_NAME),
    }
}

/// Default global configuration directory (`~/.config/tether` on Linux).
pub fn default_global_dir() -> anyhow::Result<PathBuf> {
    if let Some(dir) = dirs::config_dir() {
        return Ok(dir.join("tether"));
    }
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    Ok(home.join(".config").join("tether"))
}
