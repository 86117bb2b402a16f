//! Init command: write a starter `tether.toml`.

use std::path::PathBuf;

use tracing::info;

use crate::config::{ConfigScope, ConfigStore, TetherConfig, paths::default_global_dir};

/// Options for the init command
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Layer to create
    pub scope: ConfigScope,
    /// Overwrite an existing file
    pub reset: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            scope: ConfigScope::Project,
            reset: false,
        }
    }
}

impl InitOptions {
    pub fn with_scope(mut self, scope: ConfigScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }
}

#[derive(Debug, Clone)]
pub struct InitReport {
    pub path: PathBuf,
    /// An existing file was replaced
    pub overwritten: bool,
}

pub struct InitCommand {
    global_dir: PathBuf,
    project_root: PathBuf,
}

impl InitCommand {
    pub fn new(global_dir: PathBuf, project_root: PathBuf) -> Self {
        Self {
            global_dir,
            project_root,
        }
    }

    /// Create an init command with default paths
    pub fn with_defaults() -> anyhow::Result<Self> {
        Ok(Self::new(default_global_dir()?, std::env::current_dir()?))
    }

    pub fn execute(&self, options: &InitOptions) -> anyhow::Result<InitReport> {
        let store = ConfigStore::from_paths(
            options.scope,
            self.global_dir.clone(),
            self.project_root.clone(),
        );

        let existed = store.exists();
        if existed && !options.reset {
            anyhow::bail!(
                "Configuration already exists at {}. Use --reset to overwrite it.",
                store.config_path().display()
            );
        }

        store.save(&TetherConfig::with_default_networks())?;
        info!(path = %store.config_path().display(), "Initialized configuration");

        Ok(InitReport {
            path: store.config_path().to_path_buf(),
            overwritten: existed,
        })
    }
}
