//! Host facts that do not live in the registry.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Relative location of the ARM32 command interpreter that only exists on
/// ARM64 Windows.
pub const ARM_MARKER: &str = r"SysArm32\cmd.exe";

/// Version quad read from a binary's version resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub revision: u32,
}

impl FileVersion {
    pub const fn new(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self {
            major,
            minor,
            build,
            revision,
        }
    }
}

impl fmt::Display for FileVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.major, self.minor, self.build, self.revision)
    }
}

impl FromStr for FileVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = |reason: &str| Error::MalformedValue {
            location: "file version".to_string(),
            reason: format!("'{s}': {reason}"),
        };

        let mut parts = [0u32; 4];
        let mut count = 0;
        for part in s.trim().split('.') {
            if count == parts.len() {
                return Err(malformed("more than four components"));
            }
            parts[count] = part.parse().map_err(|_| malformed("non-numeric component"))?;
            count += 1;
        }
        if count < 3 {
            return Err(malformed("expected major.minor.build[.revision]"));
        }

        Ok(Self::new(parts[0], parts[1], parts[2], parts[3]))
    }
}

impl TryFrom<String> for FileVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<FileVersion> for String {
    fn from(value: FileVersion) -> Self {
        value.to_string()
    }
}

/// Host probes used alongside the configuration store.
pub trait HostProbe {
    /// Version quad of the core system library (`kernel32.dll`).
    fn system_file_version(&self) -> Result<FileVersion>;

    /// Whether the operating system itself is 64-bit, independent of the
    /// bitness of the running process.
    fn is_64bit_os(&self) -> bool;

    /// Whether the ARM64 marker file exists under the Windows directory.
    fn arm_marker_present(&self) -> bool;

    /// Expand a branding placeholder such as `%WINDOWS_LONG%`. `None` when the
    /// branding library is missing or returns the placeholder unchanged.
    fn os_branding(&self, ids: &str) -> Option<String>;

    /// The shell's "any server" product flag.
    fn is_any_server(&self) -> bool;

    fn env_var(&self, name: &str) -> Option<String>;
}

/// Path of the ARM64 marker under the given Windows directory.
pub fn arm_marker_path(windir: impl AsRef<Path>) -> PathBuf {
    windir.as_ref().join(ARM_MARKER)
}

/// Whether the native CPU architecture of the host is 64-bit.
pub fn native_cpu_is_64bit() -> bool {
    cpu_arch_is_64bit(&sysinfo::System::cpu_arch())
}

fn cpu_arch_is_64bit(arch: &str) -> bool {
    match arch.to_ascii_lowercase().as_str() {
        "x86_64" | "amd64" | "x64" | "aarch64" | "arm64" | "ia64" => true,
        "i386" | "i686" | "x86" | "arm" | "armv7l" => false,
        _ => cfg!(target_pointer_width = "64"),
    }
}
