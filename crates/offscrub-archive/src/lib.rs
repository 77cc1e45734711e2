//! Reading and extracting the bundled removal scripts.
//!
//! # Architecture
//!
//! - `format.rs` - Magic-byte format detection
//! - `read.rs` - Zip and tar entry enumeration
//! - `sanitize.rs` - Path sanitization (zip-slip prevention)
//! - `extract.rs` - Overwrite extraction of file entries
//! - `entry.rs` - Shared types

pub use entry::{BundleEntry, ExtractReport, ExtractedFile};
pub use error::{Error, Result};
pub use extract::extract_entries;
pub use format::{BundleFormat, detect_format};
pub use read::read_entries;

pub mod entry;
mod error;
mod extract;
mod format;
mod read;
mod sanitize;

use std::path::{Path, PathBuf};

use tracing::debug;

/// Where the script bundle comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BundleSource {
    File(PathBuf),
    Bytes(Vec<u8>),
}

impl BundleSource {
    pub fn load(&self) -> Result<Vec<u8>> {
        match self {
            Self::File(path) => {
                debug!(path = %path.display(), "loading bundle");
                Ok(std::fs::read(path)?)
            }
            Self::Bytes(bytes) => Ok(bytes.clone()),
        }
    }

    /// Read the bundle and write all its files beneath `dest`.
    pub fn extract_to(&self, dest: &Path) -> Result<ExtractReport> {
        let data = self.load()?;
        let (format, entries) = read_entries(&data)?;
        let mut report = extract_entries(&entries, dest)?;
        report.format = Some(format);
        Ok(report)
    }
}

impl From<PathBuf> for BundleSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<Vec<u8>> for BundleSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}
