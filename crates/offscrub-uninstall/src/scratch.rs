use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::{Error, Result};

/// Uniquely named directory owned by one uninstall job. Removed with its
/// contents when dropped.
#[derive(Debug)]
pub struct ScratchDir(Option<TempDir>);

impl ScratchDir {
    /// Create under `root`, or the system temp dir when `None`.
    pub fn create(root: Option<&Path>) -> Result<Self> {
        let root = root.map_or_else(std::env::temp_dir, Path::to_path_buf);
        let dir = tempfile::Builder::new()
            .prefix("offscrub-")
            .tempdir_in(&root)
            .map_err(|source| Error::Scratch {
                root: root.clone(),
                source,
            })?;
        debug!(path = %dir.path().display(), "created scratch directory");
        Ok(Self(Some(dir)))
    }

    pub fn path(&self) -> &Path {
        self.0.as_ref().map_or(Path::new(""), TempDir::path)
    }

    pub fn join(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path().join(name)
    }

    /// Remove now and report failures instead of logging them.
    pub fn close(mut self) -> io::Result<()> {
        match self.0.take() {
            Some(dir) => dir.close(),
            None => Ok(()),
        }
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Some(dir) = self.0.take() {
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => debug!(path = %path.display(), "removed scratch directory"),
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove scratch directory"),
            }
        }
    }
}
