//! Contract source loaders.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Reads contract source text from a location named in the configuration.
pub trait SourceLoader {
    fn load(&self, location: &str) -> io::Result<String>;
}

/// Loads sources from disk, resolving relative locations against a root.
#[derive(Debug, Clone)]
pub struct FilesystemLoader {
    root: PathBuf,
}

impl FilesystemLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceLoader for FilesystemLoader {
    fn load(&self, location: &str) -> io::Result<String> {
        let path = Path::new(location);
        let full = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        };
        std::fs::read_to_string(full)
    }
}

/// Serves sources from memory; used when sources are generated or embedded.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    sources: HashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, location: impl Into<String>, source: impl Into<String>) -> Self {
        self.sources.insert(location.into(), source.into());
        self
    }
}

impl SourceLoader for MemoryLoader {
    fn load(&self, location: &str) -> io::Result<String> {
        self.sources.get(location).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no source registered for {}", location),
            )
        })
    }
}
