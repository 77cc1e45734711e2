//! Version resources, product branding and the shell's OS flags.

use std::ffi::c_void;
use std::path::Path;

use tracing::debug;
use windows::Win32::Foundation::{HLOCAL, LocalFree};
use windows::Win32::Storage::FileSystem::{
    GetFileVersionInfoSizeW, GetFileVersionInfoW, VS_FIXEDFILEINFO, VerQueryValueW,
};
use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};
use windows::Win32::UI::Shell::{IsOS, OS_ANYSERVER};
use windows::core::{HSTRING, PCWSTR, PWSTR, s, w};

use super::handles::LibraryHandle;
use crate::host::FileVersion;
use crate::{Error, Result};

pub(super) fn file_version(path: &Path) -> Result<FileVersion> {
    let wide = HSTRING::from(path.as_os_str());
    let not_available = || Error::NotAvailable(format!("version resource of {}", path.display()));

    let size = unsafe { GetFileVersionInfoSizeW(&wide, None) };
    if size == 0 {
        return Err(not_available());
    }

    let mut block = vec![0u8; size as usize];
    unsafe { GetFileVersionInfoW(&wide, None, size, block.as_mut_ptr() as *mut c_void) }
        .map_err(|_| not_available())?;

    let mut info: *mut c_void = std::ptr::null_mut();
    let mut len = 0u32;
    let found = unsafe { VerQueryValueW(block.as_ptr() as *const c_void, w!("\\"), &mut info, &mut len) };
    if !found.as_bool() || info.is_null() || (len as usize) < std::mem::size_of::<VS_FIXEDFILEINFO>() {
        return Err(not_available());
    }

    // `info` points into `block`, which outlives this read.
    let fixed = unsafe { &*(info as *const VS_FIXEDFILEINFO) };
    let version = FileVersion::new(
        fixed.dwFileVersionMS >> 16,
        fixed.dwFileVersionMS & 0xffff,
        fixed.dwFileVersionLS >> 16,
        fixed.dwFileVersionLS & 0xffff,
    );
    debug!(path = %path.display(), %version, "file version");
    Ok(version)
}

type BrandingFormatString = unsafe extern "system" fn(PCWSTR) -> PWSTR;

pub(super) fn branding(ids: &str) -> Option<String> {
    let library = LibraryHandle(unsafe { LoadLibraryW(w!("winbrand.dll")) }.ok()?);
    let proc = unsafe { GetProcAddress(library.handle(), s!("BrandingFormatString")) }?;
    let format: BrandingFormatString = unsafe { std::mem::transmute(proc) };

    let input = HSTRING::from(ids);
    let raw = unsafe { format(PCWSTR(input.as_ptr())) };
    if raw.is_null() {
        return None;
    }
    let text = unsafe { raw.to_string() }.ok();
    unsafe {
        let _ = LocalFree(Some(HLOCAL(raw.0 as *mut c_void)));
    }

    text.filter(|t| !t.is_empty() && t != ids)
}

pub(super) fn is_any_server() -> bool {
    unsafe { IsOS(OS_ANYSERVER) }.as_bool()
}
