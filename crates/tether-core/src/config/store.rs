//! Config store for loading and saving tether.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{ConfigScope, TetherConfig, merge_configs, parser, paths::config_path_for_scope};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    scope: ConfigScope,
    config_path: PathBuf,
    project_root: PathBuf,
}

impl ConfigStore {
    pub fn from_scope(scope: ConfigScope) -> anyhow::Result<Self> {
        let global_dir = super::paths::default_global_dir()?;
        let project_root = std::env::current_dir()?;

        Ok(Self::from_paths(scope, global_dir, project_root))
    }

    pub fn from_paths(scope: ConfigScope, global_dir: PathBuf, project_root: PathBuf) -> Self {
        let config_path = config_path_for_scope(scope, &global_dir, &project_root);
        Self {
            scope,
            config_path,
            project_root,
        }
    }

    pub fn scope(&self) -> ConfigScope {
        self.scope
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }

    /// Load this layer, or `None` when the file does not exist.
    pub fn load_optional(&self) -> anyhow::Result<Option<TetherConfig>> {
        if !self.exists() {
            return Ok(None);
        }
        parser::parse_tether_toml(&self.config_path).map(Some)
    }

    pub fn load(&self) -> anyhow::Result<TetherConfig> {
        Ok(self.load_optional()?.unwrap_or_default())
    }

    pub fn save(&self, config: &TetherConfig) -> anyhow::Result<()> {
        let content = parser::to_toml(config).context("Failed to serialize config to TOML")?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.config_path, content).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;
        Ok(())
    }
}

/// Load and merge the global and project layers.
///
/// Fails when neither layer exists, since there is nothing to deploy.
pub fn load_merged(global_dir: &Path, project_root: &Path) -> anyhow::Result<TetherConfig> {
    let global = ConfigStore::from_paths(
        ConfigScope::Global,
        global_dir.to_path_buf(),
        project_root.to_path_buf(),
    );
    let project = ConfigStore::from_paths(
        ConfigScope::Project,
        global_dir.to_path_buf(),
        project_root.to_path_buf(),
    );

    let global_config = global.load_optional()?;
    let project_config = project.load_optional()?;
    if global_config.is_none() && project_config.is_none() {
        anyhow::bail!(
            "No configuration found at {} or {}. Run 'tether init' first.",
            project.config_path().display(),
            global.config_path().display()
        );
    }

    let merged = merge_configs(global_config, project_config);
    merged
        .validate()
        .context("Merged configuration is invalid")?;
    Ok(merged)
}
