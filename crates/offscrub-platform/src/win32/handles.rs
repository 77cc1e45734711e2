//! RAII wrappers for Windows handles.

use windows::Win32::Foundation::{FreeLibrary, HMODULE};
use windows::Win32::System::Com::CoUninitialize;
use windows::Win32::System::Registry::{HKEY, RegCloseKey};
use windows::Win32::System::Services::{CloseServiceHandle, SC_HANDLE};

pub(super) struct RegistryHandle(pub(super) HKEY);

impl RegistryHandle {
    #[inline]
    pub(super) fn handle(&self) -> HKEY {
        self.0
    }
}

impl Drop for RegistryHandle {
    fn drop(&mut self) {
        if !self.0.is_invalid() {
            unsafe {
                let _ = RegCloseKey(self.0);
            }
        }
    }
}

/// Service control manager or service handle.
pub(super) struct ScHandle(pub(super) SC_HANDLE);

impl ScHandle {
    #[inline]
    pub(super) fn handle(&self) -> SC_HANDLE {
        self.0
    }
}

impl Drop for ScHandle {
    fn drop(&mut self) {
        if !self.0.is_invalid() {
            unsafe {
                let _ = CloseServiceHandle(self.0);
            }
        }
    }
}

pub(super) struct LibraryHandle(pub(super) HMODULE);

impl LibraryHandle {
    #[inline]
    pub(super) fn handle(&self) -> HMODULE {
        self.0
    }
}

impl Drop for LibraryHandle {
    fn drop(&mut self) {
        if !self.0.is_invalid() {
            unsafe {
                let _ = FreeLibrary(self.0);
            }
        }
    }
}

/// Balances a successful `CoInitializeEx` on the current thread.
pub(super) struct ComApartment;

impl Drop for ComApartment {
    fn drop(&mut self) {
        unsafe { CoUninitialize() };
    }
}
