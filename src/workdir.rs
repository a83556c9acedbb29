//! Scoped staging directory.

use std::path::{Path, PathBuf};

use crate::error::{Result, SignatureError};

/// A staging directory removed, with everything in it, when dropped.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    /// Create `path` (non-recursively). An existing directory is reused.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError::Io`] if creation fails for any reason other
    /// than the directory already existing.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        match std::fs::create_dir(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                tracing::debug!(path = %path.display(), "reusing existing working directory");
            }
            Err(e) => {
                return Err(SignatureError::io(
                    format!("create workdir {}", path.display()),
                    e,
                ));
            }
        }
        Ok(Self { path })
    }

    /// Location of the directory.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "removed working directory"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "could not remove working directory"
            ),
        }
    }
}
