//! Per-request scratch storage
//!
//! Each request works in its own `<root>/<uuid>/` directory. The directory
//! is removed when the [`ScratchDir`] is dropped, whichever way the request
//! ends.

use crate::error::Result;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A scratch directory owned by one request
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Create a fresh directory under `root`
    pub fn create(root: &Path) -> Result<Self> {
        let path = root.join(Uuid::new_v4().to_string());
        std::fs::create_dir_all(&path)?;
        tracing::debug!("Created scratch directory {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a file into the directory. Only the final component of `name`
    /// is used.
    pub fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let file_name = Path::new(name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "upload".into());
        let path = self.path.join(file_name);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => tracing::debug!("Removed scratch directory {}", self.path.display()),
            Err(e) => tracing::warn!(
                "Failed to remove scratch directory {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
