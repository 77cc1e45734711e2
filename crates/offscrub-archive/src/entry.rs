use std::path::PathBuf;

use crate::format::BundleFormat;

/// One named blob read from a bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleEntry {
    /// Name as stored in the archive, relative to its root.
    pub name: PathBuf,
    pub is_dir: bool,
    pub contents: Vec<u8>,
}

impl BundleEntry {
    pub fn file(name: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            is_dir: false,
            contents: contents.into(),
        }
    }

    pub fn dir(name: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
            contents: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedFile {
    pub original_path: PathBuf,
    pub target_path: PathBuf,
    pub size: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractReport {
    pub format: Option<BundleFormat>,
    pub total_bytes: u64,
    pub files: Vec<ExtractedFile>,
}

impl ExtractReport {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}
