//! Per-format entry enumeration.

use std::io::{Cursor, Read};
use std::path::PathBuf;

use tracing::trace;

use crate::entry::BundleEntry;
use crate::error::{Error, Result};
use crate::format::{BundleFormat, detect_format};

/// Enumerate every entry of an in-memory bundle, sniffing its format.
pub fn read_entries(data: &[u8]) -> Result<(BundleFormat, Vec<BundleEntry>)> {
    let format = detect_format(data).ok_or(Error::UnsupportedFormat)?;
    let entries = match format {
        BundleFormat::Zip => read_zip(data)?,
        BundleFormat::TarGz => read_tar(flate2::read::GzDecoder::new(data))?,
        BundleFormat::Tar => read_tar(data)?,
    };
    trace!(%format, entries = entries.len(), "read bundle");
    Ok((format, entries))
}

fn read_zip(data: &[u8]) -> Result<Vec<BundleEntry>> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(data)).map_err(|e| Error::Corrupted(e.to_string()))?;

    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive
            .by_index(index)
            .map_err(|e| Error::Corrupted(e.to_string()))?;
        let name = PathBuf::from(file.name());
        if file.is_dir() {
            entries.push(BundleEntry::dir(name));
            continue;
        }

        let mut contents = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut contents)
            .map_err(|e| Error::Corrupted(format!("{}: {e}", name.display())))?;
        entries.push(BundleEntry::file(name, contents));
    }
    Ok(entries)
}

fn read_tar<R: Read>(reader: R) -> Result<Vec<BundleEntry>> {
    let mut archive = tar::Archive::new(reader);
    let mut entries = Vec::new();

    for entry in archive
        .entries()
        .map_err(|e| Error::Corrupted(e.to_string()))?
    {
        let mut entry = entry.map_err(|e| Error::Corrupted(e.to_string()))?;
        let name = entry
            .path()
            .map_err(|_| Error::InvalidPath)?
            .into_owned();
        let kind = entry.header().entry_type();

        if kind.is_dir() {
            entries.push(BundleEntry::dir(name));
        } else if kind.is_file() {
            let mut contents = Vec::new();
            entry
                .read_to_end(&mut contents)
                .map_err(|e| Error::Corrupted(format!("{}: {e}", name.display())))?;
            entries.push(BundleEntry::file(name, contents));
        } else {
            trace!(name = %name.display(), "skipping non-regular tar entry");
        }
    }
    Ok(entries)
}
