//! Registry reads with explicit 32/64-bit view selection.

use std::ffi::c_void;

use tracing::trace;
use windows::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_MORE_DATA, ERROR_PATH_NOT_FOUND, ERROR_SUCCESS, WIN32_ERROR};
use windows::Win32::System::Registry::{
    HKEY, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ, KEY_WOW64_32KEY, KEY_WOW64_64KEY,
    REG_DWORD, REG_EXPAND_SZ, REG_MULTI_SZ, REG_QWORD, REG_SAM_FLAGS, REG_SZ, REG_VALUE_TYPE,
    RRF_NOEXPAND, RRF_RT_ANY, RegGetValueW, RegOpenKeyExW,
};
use windows::core::{HSTRING, PCWSTR};

use super::handles::RegistryHandle;
use crate::store::{Hive, View};
use crate::{Error, Result};

fn root(hive: Hive) -> HKEY {
    match hive {
        Hive::LocalMachine => HKEY_LOCAL_MACHINE,
        Hive::CurrentUser => HKEY_CURRENT_USER,
    }
}

fn view_flag(view: View) -> REG_SAM_FLAGS {
    match view {
        View::Registry32 => KEY_WOW64_32KEY,
        View::Registry64 => KEY_WOW64_64KEY,
    }
}

fn is_absent(status: WIN32_ERROR) -> bool {
    status == ERROR_FILE_NOT_FOUND || status == ERROR_PATH_NOT_FOUND
}

fn open(hive: Hive, view: View, key_path: &str) -> Result<Option<RegistryHandle>> {
    let mut key = HKEY::default();
    let status = unsafe {
        RegOpenKeyExW(
            root(hive),
            &HSTRING::from(key_path),
            None,
            KEY_READ | view_flag(view),
            &mut key,
        )
    };
    if is_absent(status) {
        return Ok(None);
    }
    status
        .ok()
        .map_err(|e| Error::Transport(format!("open {hive}\\{key_path} ({view}): {e}")))?;
    Ok(Some(RegistryHandle(key)))
}

pub(super) fn key_exists(hive: Hive, view: View, key_path: &str) -> Result<bool> {
    Ok(open(hive, view, key_path)?.is_some())
}

pub(super) fn read_value(
    hive: Hive,
    view: View,
    key_path: &str,
    value_name: &str,
) -> Result<Option<String>> {
    let Some(key) = open(hive, view, key_path)? else {
        trace!(%hive, %view, key_path, "registry key absent");
        return Ok(None);
    };
    let name = HSTRING::from(value_name);
    let location = || format!("{hive}\\{key_path}\\{value_name} ({view})");

    let mut buffer: Vec<u8> = vec![0; 512];
    loop {
        let mut kind = REG_VALUE_TYPE::default();
        let mut size = buffer.len() as u32;
        let status = unsafe {
            RegGetValueW(
                key.handle(),
                PCWSTR::null(),
                &name,
                RRF_RT_ANY | RRF_NOEXPAND,
                Some(&mut kind as *mut _),
                Some(buffer.as_mut_ptr() as *mut c_void),
                Some(&mut size as *mut _),
            )
        };

        if status == ERROR_MORE_DATA {
            buffer.resize(size as usize, 0);
            continue;
        }
        if is_absent(status) {
            return Ok(None);
        }
        if status != ERROR_SUCCESS {
            return Err(Error::Transport(format!("{}: {:?}", location(), status)));
        }

        buffer.truncate(size as usize);
        return decode(kind, &buffer).map(Some).ok_or_else(|| Error::MalformedValue {
            location: location(),
            reason: format!("unsupported value type {}", kind.0),
        });
    }
}

fn decode(kind: REG_VALUE_TYPE, data: &[u8]) -> Option<String> {
    match kind {
        REG_SZ | REG_EXPAND_SZ => Some(wide_to_string(data)),
        REG_MULTI_SZ => {
            let text = String::from_utf16_lossy(&to_wide(data));
            Some(
                text.split('\0')
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(" "),
            )
        }
        REG_DWORD => data
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .map(|b| u32::from_le_bytes(b).to_string()),
        REG_QWORD => data
            .get(..8)
            .and_then(|b| b.try_into().ok())
            .map(|b| u64::from_le_bytes(b).to_string()),
        _ => None,
    }
}

fn to_wide(data: &[u8]) -> Vec<u16> {
    data.chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

fn wide_to_string(data: &[u8]) -> String {
    let wide = to_wide(data);
    let end = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
    String::from_utf16_lossy(&wide[..end])
}
