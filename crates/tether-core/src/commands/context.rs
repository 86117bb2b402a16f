//! Project context shared by the plan and deploy commands.
//!
//! Resolves the configuration directories once and caches the merged
//! project state, so a command loads `tether.toml` at most once.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::{load_merged, paths::default_global_dir};
use crate::contracts::FilesystemLoader;
use crate::state::ProjectState;

pub struct ProjectContext {
    /// Global config directory (e.g., ~/.config/tether)
    global_dir: PathBuf,
    /// Project root, where `tether.toml` and contract sources live
    project_root: PathBuf,
    state_cache: OnceLock<ProjectState>,
}

impl ProjectContext {
    pub fn new(global_dir: PathBuf, project_root: PathBuf) -> Self {
        Self {
            global_dir,
            project_root,
            state_cache: OnceLock::new(),
        }
    }

    /// Context for the current directory and the user's config directory.
    pub fn with_defaults() -> anyhow::Result<Self> {
        let global_dir = default_global_dir()?;
        let project_root = std::env::current_dir()?;
        Ok(Self::new(global_dir, project_root))
    }

    pub fn global_dir(&self) -> &Path {
        &self.global_dir
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Merged project state, loaded on first access.
    pub fn state(&self) -> anyhow::Result<&ProjectState> {
        if let Some(state) = self.state_cache.get() {
            return Ok(state);
        }
        let config = load_merged(&self.global_dir, &self.project_root)?;
        let state = ProjectState::new(self.project_root.clone(), config);
        Ok(self.state_cache.get_or_init(|| state))
    }

    /// Loader resolving contract sources relative to the project root.
    pub fn loader(&self) -> FilesystemLoader {
        FilesystemLoader::new(self.project_root.clone())
    }
}
