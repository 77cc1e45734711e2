use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BundleFormat {
    Zip,
    TarGz,
    Tar,
}

impl fmt::Display for BundleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zip => f.write_str("zip"),
            Self::TarGz => f.write_str("tar.gz"),
            Self::Tar => f.write_str("tar"),
        }
    }
}

/// Identify a bundle by its leading magic bytes.
pub fn detect_format(data: &[u8]) -> Option<BundleFormat> {
    match data {
        [0x50, 0x4B, 0x03, 0x04, ..] | [0x50, 0x4B, 0x05, 0x06, ..] => Some(BundleFormat::Zip),
        [0x1F, 0x8B, ..] => Some(BundleFormat::TarGz),
        _ if is_tar_header(data) => Some(BundleFormat::Tar),
        _ => None,
    }
}

fn is_tar_header(data: &[u8]) -> bool {
    data.len() >= 512 && &data[257..262] == b"ustar"
}
