//! Live Windows backend.

mod handles;
mod registry;
mod services;
mod version;
mod wmi;

use std::path::PathBuf;

use tracing::debug;
use windows::Win32::System::SystemInformation::{GetSystemDirectoryW, GetWindowsDirectoryW};

use crate::host::{self, FileVersion, HostProbe};
use crate::store::{ConfigStore, Hive, PropertyBag, View};
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct WindowsPlatform {
    windows_dir: PathBuf,
    system_dir: PathBuf,
}

impl WindowsPlatform {
    /// Locate the Windows and system directories. COM is entered per query.
    pub fn connect() -> Result<Self> {
        let windows_dir = directory(|buf| unsafe { GetWindowsDirectoryW(Some(buf)) })
            .ok_or_else(|| Error::NotAvailable("Windows directory".to_string()))?;
        let system_dir = directory(|buf| unsafe { GetSystemDirectoryW(Some(buf)) })
            .ok_or_else(|| Error::NotAvailable("system directory".to_string()))?;
        debug!(windows = %windows_dir.display(), system = %system_dir.display(), "connected to host");
        Ok(Self {
            windows_dir,
            system_dir,
        })
    }
}

fn directory(fill: impl Fn(&mut [u16]) -> u32) -> Option<PathBuf> {
    let mut buf = vec![0u16; 260];
    let mut len = fill(&mut buf) as usize;
    if len > buf.len() {
        buf.resize(len, 0);
        len = fill(&mut buf) as usize;
    }
    if len == 0 || len > buf.len() {
        return None;
    }
    Some(PathBuf::from(String::from_utf16_lossy(&buf[..len])))
}

impl ConfigStore for WindowsPlatform {
    fn read_value(
        &self,
        hive: Hive,
        view: View,
        key_path: &str,
        value_name: &str,
    ) -> Result<Option<String>> {
        registry::read_value(hive, view, key_path, value_name)
    }

    fn key_exists(&self, hive: Hive, view: View, key_path: &str) -> Result<bool> {
        registry::key_exists(hive, view, key_path)
    }

    fn query_management(&self, namespace: &str, query: &str) -> Result<Vec<PropertyBag>> {
        wmi::query(namespace, query)
    }

    fn is_service_registered(&self, name: &str) -> Result<bool> {
        services::is_registered(name)
    }
}

impl HostProbe for WindowsPlatform {
    fn system_file_version(&self) -> Result<FileVersion> {
        version::file_version(&self.system_dir.join("kernel32.dll"))
    }

    fn is_64bit_os(&self) -> bool {
        host::native_cpu_is_64bit()
    }

    fn arm_marker_present(&self) -> bool {
        host::arm_marker_path(&self.windows_dir).is_file()
    }

    fn os_branding(&self, ids: &str) -> Option<String> {
        version::branding(ids)
    }

    fn is_any_server(&self) -> bool {
        version::is_any_server()
    }

    fn env_var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}
