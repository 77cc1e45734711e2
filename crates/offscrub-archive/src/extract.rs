use std::fs;
use std::path::Path;

use tracing::debug;

use crate::entry::{BundleEntry, ExtractReport, ExtractedFile};
use crate::error::{Error, Result};
use crate::sanitize::sanitize_path;

/// Write every file entry beneath `dest`, keeping relative paths and
/// replacing whatever is already there. Directory entries are implied by
/// the files they contain and are not created on their own.
pub fn extract_entries(entries: &[BundleEntry], dest: &Path) -> Result<ExtractReport> {
    let mut files = Vec::new();
    let mut total_bytes = 0u64;

    for entry in entries.iter().filter(|e| !e.is_dir) {
        let target = sanitize_path(&entry.name, dest)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreationFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&target, &entry.contents).map_err(|source| Error::ExtractionFailed {
            path: target.clone(),
            source,
        })?;

        let size = entry.contents.len() as u64;
        total_bytes += size;
        files.push(ExtractedFile {
            original_path: entry.name.clone(),
            target_path: target,
            size,
        });
    }

    debug!(dest = %dest.display(), files = files.len(), total_bytes, "extracted bundle");
    Ok(ExtractReport {
        format: None,
        total_bytes,
        files,
    })
}
