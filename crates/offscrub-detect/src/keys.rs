//! Registry locations, management queries and thresholds consulted during
//! detection.

pub const CIMV2: &str = r"root\CIMV2";
pub const OPERATING_SYSTEM_QUERY: &str = "SELECT * FROM Win32_OperatingSystem";
pub const WINDOWS_LICENSING_QUERY: &str = "SELECT Version FROM SoftwareLicensingService";
pub const OFFICE_LICENSING_QUERY: &str = "SELECT Version FROM OfficeSoftwareProtectionService";

pub const CURRENT_VERSION: &str = r"SOFTWARE\Microsoft\Windows NT\CurrentVersion";

pub const CLICK_TO_RUN: &str = r"SOFTWARE\Microsoft\Office\ClickToRun";
pub const CLICK_TO_RUN_CONFIGURATION: &str = r"SOFTWARE\Microsoft\Office\ClickToRun\Configuration";
pub const CLICK_TO_RUN_15: &str = r"SOFTWARE\Microsoft\Office\15.0\ClickToRun";
pub const CLICK_TO_RUN_15_CONFIGURATION: &str =
    r"SOFTWARE\Microsoft\Office\15.0\ClickToRun\Configuration";
pub const CLICK_TO_RUN_15_CULTURE: &str =
    r"SOFTWARE\Microsoft\Office\15.0\ClickToRun\ProductReleaseIDs\Active\culture";

/// Services registered by a Click-to-Run installation.
pub const CLICK_TO_RUN_SERVICES: [&str; 2] = ["ClickToRunSvc", "OfficeSvc"];

/// Traditional generations, newest first. Probe order matters.
pub const TRADITIONAL_GENERATIONS: [u8; 5] = [16, 15, 14, 12, 11];

pub const WINDOWS_LONG_BRANDING: &str = "%WINDOWS_LONG%";
pub const WINDOWS_11_MARKER: &str = "windows 11";

/// Below this build the OS cannot be a multi-session RDSH server.
pub const RDSH_MIN_BUILD: u32 = 17063;
pub const RDSH_SKU: i64 = 175;
/// From this build on the management engine reports the authoritative build.
pub const MANAGEMENT_BUILD_MIN: u32 = 18362;

pub const SERVER_2019_MIN_BUILD: u32 = 17763;
pub const SERVER_2022_MIN_BUILD: u32 = 20251;

pub fn install_root(generation: u8) -> String {
    format!(r"SOFTWARE\Microsoft\Office\{generation}.0\Common\InstallRoot")
}
