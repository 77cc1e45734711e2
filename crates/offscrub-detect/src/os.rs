//! Windows product name, build number and support status.

use std::fmt;

use offscrub_platform::{Error as PlatformError, FileVersion, Hive, Platform, View};
use serde::{Serialize, Serializer};
use tracing::{debug, info, warn};

use crate::{Detector, Result, keys};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsName {
    Windows95,
    Windows95Se,
    Windows98,
    WindowsMe,
    WindowsNt351,
    WindowsNt40,
    Windows2000,
    WindowsXp,
    WindowsVista,
    WindowsServer2008,
    Windows7,
    Windows7Embedded,
    WindowsServer2008R2,
    Windows8,
    Windows8Embedded,
    WindowsServer2012,
    Windows81,
    Windows81Embedded,
    WindowsServer2012R2,
    Windows10TechnicalPreview,
    WindowsServerTechnicalPreview,
    Windows10,
    Windows10IoT,
    WindowsServer2016,
    WindowsServer2019,
    WindowsServer2022,
    Windows11,
    Unknown,
}

impl OsName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows95 => "Windows 95",
            Self::Windows95Se => "Windows 95 SE",
            Self::Windows98 => "Windows 98",
            Self::WindowsMe => "Windows ME",
            Self::WindowsNt351 => "Windows NT 3.51",
            Self::WindowsNt40 => "Windows NT 4.0",
            Self::Windows2000 => "Windows 2000",
            Self::WindowsXp => "Windows XP",
            Self::WindowsVista => "Windows Vista",
            Self::WindowsServer2008 => "Windows Server 2008",
            Self::Windows7 => "Windows 7",
            Self::Windows7Embedded => "Windows 7 Embedded",
            Self::WindowsServer2008R2 => "Windows Server 2008 R2",
            Self::Windows8 => "Windows 8",
            Self::Windows8Embedded => "Windows 8 Embedded",
            Self::WindowsServer2012 => "Windows Server 2012",
            Self::Windows81 => "Windows 8.1",
            Self::Windows81Embedded => "Windows 8.1 Embedded",
            Self::WindowsServer2012R2 => "Windows Server 2012 R2",
            Self::Windows10TechnicalPreview => "Windows 10 Technical Preview",
            Self::WindowsServerTechnicalPreview => "Windows Server Technical Preview",
            Self::Windows10 => "Windows 10",
            Self::Windows10IoT => "Windows 10 IoT",
            Self::WindowsServer2016 => "Windows Server 2016",
            Self::WindowsServer2019 => "Windows Server 2019",
            Self::WindowsServer2022 => "Windows Server 2022",
            Self::Windows11 => "Windows 11",
            Self::Unknown => "Unknown",
        }
    }

    /// Map a kernel32 version and edition to a product name using the
    /// dispatch table. Unmapped combinations give `Unknown`.
    pub fn from_version(version: FileVersion, is_server: bool) -> Self {
        NAME_TABLE
            .iter()
            .find(|rule| rule.matches(version, is_server))
            .map_or(Self::Unknown, |rule| rule.name)
    }

    /// Whether the name for this version depends on the client/server edition.
    pub fn depends_on_edition(version: FileVersion) -> bool {
        NAME_TABLE
            .iter()
            .any(|rule| rule.edition != Edition::Any && rule.covers(version))
    }
}

impl fmt::Display for OsName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OsName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edition {
    Any,
    Client,
    Server,
}

struct NameRule {
    major: u32,
    minor: Option<u32>,
    edition: Edition,
    min_build: u32,
    name: OsName,
}

const fn rule(major: u32, minor: Option<u32>, edition: Edition, min_build: u32, name: OsName) -> NameRule {
    NameRule {
        major,
        minor,
        edition,
        min_build,
        name,
    }
}

impl NameRule {
    fn covers(&self, version: FileVersion) -> bool {
        self.major == version.major && self.minor.is_none_or(|m| m == version.minor)
    }

    fn matches(&self, version: FileVersion, is_server: bool) -> bool {
        let edition = match self.edition {
            Edition::Any => true,
            Edition::Client => !is_server,
            Edition::Server => is_server,
        };
        self.covers(version) && edition && version.build >= self.min_build
    }
}

/// Evaluated top to bottom; the first matching rule names the OS.
const NAME_TABLE: &[NameRule] = &[
    rule(3, None, Edition::Any, 0, OsName::WindowsNt351),
    rule(4, None, Edition::Any, 0, OsName::WindowsNt40),
    rule(5, Some(0), Edition::Any, 0, OsName::Windows2000),
    rule(5, None, Edition::Any, 0, OsName::WindowsXp),
    rule(6, Some(0), Edition::Client, 0, OsName::WindowsVista),
    rule(6, Some(0), Edition::Server, 0, OsName::WindowsServer2008),
    rule(6, Some(1), Edition::Client, 0, OsName::Windows7),
    rule(6, Some(1), Edition::Server, 0, OsName::WindowsServer2008R2),
    rule(6, Some(2), Edition::Client, 0, OsName::Windows8),
    rule(6, Some(2), Edition::Server, 0, OsName::WindowsServer2012),
    rule(6, Some(3), Edition::Client, 0, OsName::Windows81),
    rule(6, Some(3), Edition::Server, 0, OsName::WindowsServer2012R2),
    rule(6, Some(4), Edition::Client, 0, OsName::Windows10TechnicalPreview),
    rule(6, Some(4), Edition::Server, 0, OsName::WindowsServerTechnicalPreview),
    rule(10, Some(0), Edition::Client, 0, OsName::Windows10),
    rule(10, Some(0), Edition::Server, keys::SERVER_2022_MIN_BUILD, OsName::WindowsServer2022),
    rule(10, Some(0), Edition::Server, keys::SERVER_2019_MIN_BUILD, OsName::WindowsServer2019),
    rule(10, Some(0), Edition::Server, 0, OsName::WindowsServer2016),
    rule(11, Some(0), Edition::Client, 0, OsName::Windows11),
];

/// Facts about the running Windows installation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OsInfo {
    pub name: OsName,
    pub build_number: u32,
    pub is_server: bool,
    pub is_supported: bool,
    pub windows_number: f64,
}

impl<P: Platform + ?Sized> Detector<'_, P> {
    pub fn windows_product_name(&self) -> Result<OsName> {
        let version = self.platform.system_file_version()?;
        let is_server = if OsName::depends_on_edition(version) {
            self.is_windows_server()?
        } else {
            false
        };

        let mut name = OsName::from_version(version, is_server);
        if name == OsName::Windows10 {
            let branding = self.platform.os_branding(keys::WINDOWS_LONG_BRANDING);
            if branding
                .as_deref()
                .is_some_and(|b| b.to_ascii_lowercase().contains(keys::WINDOWS_11_MARKER))
            {
                debug!(branding = ?branding, "branding overrides version metadata");
                name = OsName::Windows11;
            }
        }

        debug!(%version, is_server, name = %name, "resolved Windows product name");
        Ok(name)
    }

    /// Build number, refined through the management engine on newer builds.
    /// Query failures fall back to the registry instead of propagating.
    pub fn windows_build_number(&self) -> Result<u32> {
        let file_build = self.platform.system_file_version()?.build;
        if file_build < keys::MANAGEMENT_BUILD_MIN {
            return Ok(file_build);
        }

        match self.management_build() {
            Ok(Some(build)) => Ok(build),
            Ok(None) => Ok(file_build),
            Err(reason) => {
                warn!(%reason, "management build lookup failed, reading registry");
                self.registry_build(file_build)
            }
        }
    }

    fn management_build(&self) -> std::result::Result<Option<u32>, String> {
        let rows = self
            .platform
            .query_management(keys::CIMV2, keys::OPERATING_SYSTEM_QUERY)
            .map_err(|e| e.to_string())?;
        let Some(row) = rows.last() else {
            return Ok(None);
        };
        let raw = row
            .get("BuildNumber")
            .ok_or_else(|| "BuildNumber missing".to_string())?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        raw.trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("BuildNumber '{raw}' is not a number"))
    }

    fn registry_build(&self, file_build: u32) -> Result<u32> {
        let current = self.platform.read_value(
            Hive::LocalMachine,
            View::Registry64,
            keys::CURRENT_VERSION,
            "CurrentBuild",
        )?;
        let Some(current) = current else {
            return Ok(file_build);
        };
        match current.trim().parse() {
            Ok(build) => Ok(build),
            Err(_) => {
                warn!(value = %current, "CurrentBuild is not a number, keeping file build");
                Ok(file_build)
            }
        }
    }

    /// Multi-session server SKUs that license like clients. Any failure to
    /// read the SKU answers `false`.
    pub fn is_server_rdsh(&self) -> Result<bool> {
        if self.windows_build_number()? < keys::RDSH_MIN_BUILD {
            return Ok(false);
        }

        let rows = match self
            .platform
            .query_management(keys::CIMV2, keys::OPERATING_SYSTEM_QUERY)
        {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "SKU lookup failed, assuming not RDSH");
                return Ok(false);
            }
        };

        let sku = rows
            .last()
            .and_then(|row| row.get("OperatingSystemSKU"))
            .and_then(|raw| raw.trim().parse::<i64>().ok());
        debug!(sku = ?sku, "operating system SKU");
        Ok(sku == Some(keys::RDSH_SKU))
    }

    pub fn is_windows_server(&self) -> Result<bool> {
        if self.is_server_rdsh()? {
            return Ok(false);
        }
        Ok(self.platform.is_any_server())
    }

    /// `major.minor` as a number, e.g. `6.2` or `10.0`.
    pub fn windows_number(&self) -> Result<f64> {
        let version = self.platform.system_file_version()?;
        let text = format!("{}.{}", version.major, version.minor);
        text.parse().map_err(|_| {
            PlatformError::MalformedValue {
                location: "system file version".to_string(),
                reason: format!("'{text}' is not a number"),
            }
            .into()
        })
    }

    pub fn is_windows_supported(&self) -> Result<bool> {
        let number = self.windows_number()?;
        Ok((6.0..=11.0).contains(&number))
    }

    pub fn os_info(&self) -> Result<OsInfo> {
        let info = OsInfo {
            name: self.windows_product_name()?,
            build_number: self.windows_build_number()?,
            is_server: self.is_windows_server()?,
            is_supported: self.is_windows_supported()?,
            windows_number: self.windows_number()?,
        };
        info!(name = %info.name, build = info.build_number, "resolved Windows");
        Ok(info)
    }

    /// Version of the OS software licensing service.
    pub fn windows_licensing_version(&self) -> Result<String> {
        self.licensing_version(keys::WINDOWS_LICENSING_QUERY)
    }

    /// Version of the Office software protection service.
    pub fn office_licensing_version(&self) -> Result<String> {
        self.licensing_version(keys::OFFICE_LICENSING_QUERY)
    }

    fn licensing_version(&self, query: &'static str) -> Result<String> {
        let rows = self.platform.query_management(keys::CIMV2, query)?;
        let row = rows
            .first()
            .ok_or(crate::DetectionFault::LicensingServiceUnavailable { query })?;
        Ok(row.get("Version").cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(major: u32, minor: u32, build: u32) -> FileVersion {
        FileVersion::new(major, minor, build, 0)
    }

    #[test]
    fn client_and_server_split_on_shared_versions() {
        assert_eq!(OsName::from_version(v(6, 1, 7601), false), OsName::Windows7);
        assert_eq!(OsName::from_version(v(6, 1, 7601), true), OsName::WindowsServer2008R2);
        assert_eq!(OsName::from_version(v(6, 3, 9600), true), OsName::WindowsServer2012R2);
    }

    #[test]
    fn server_builds_split_into_three_releases() {
        assert_eq!(OsName::from_version(v(10, 0, 14393), true), OsName::WindowsServer2016);
        assert_eq!(OsName::from_version(v(10, 0, 17763), true), OsName::WindowsServer2019);
        assert_eq!(OsName::from_version(v(10, 0, 20348), true), OsName::WindowsServer2022);
    }

    #[test]
    fn legacy_majors_ignore_edition() {
        assert_eq!(OsName::from_version(v(5, 0, 2195), true), OsName::Windows2000);
        assert_eq!(OsName::from_version(v(5, 2, 3790), false), OsName::WindowsXp);
        assert_eq!(OsName::from_version(v(3, 51, 1057), false), OsName::WindowsNt351);
        assert!(!OsName::depends_on_edition(v(4, 0, 1381)));
        assert!(OsName::depends_on_edition(v(10, 0, 19045)));
    }

    #[test]
    fn unmapped_versions_are_unknown() {
        assert_eq!(OsName::from_version(v(6, 5, 0), false), OsName::Unknown);
        assert_eq!(OsName::from_version(v(11, 0, 22000), true), OsName::Unknown);
        assert_eq!(OsName::from_version(v(12, 0, 0), false), OsName::Unknown);
    }

    #[test]
    fn names_render_release_labels() {
        assert_eq!(OsName::WindowsServer2008R2.to_string(), "Windows Server 2008 R2");
        assert_eq!(OsName::Windows10TechnicalPreview.to_string(), "Windows 10 Technical Preview");
    }
}
