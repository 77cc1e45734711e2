use tracing::debug;
use windows::Win32::Foundation::ERROR_SERVICE_DOES_NOT_EXIST;
use windows::Win32::System::Services::{
    OpenSCManagerW, OpenServiceW, SC_MANAGER_CONNECT, SERVICE_QUERY_STATUS,
};
use windows::core::{HSTRING, PCWSTR};

use super::handles::ScHandle;
use crate::{Error, Result};

/// Whether a service named `name` is registered with the service control
/// manager, whatever its state.
pub(super) fn is_registered(name: &str) -> Result<bool> {
    let manager = unsafe { OpenSCManagerW(PCWSTR::null(), PCWSTR::null(), SC_MANAGER_CONNECT) }
        .map(ScHandle)
        .map_err(|e| Error::Transport(format!("open service control manager: {e}")))?;

    match unsafe { OpenServiceW(manager.handle(), &HSTRING::from(name), SERVICE_QUERY_STATUS) } {
        Ok(service) => {
            drop(ScHandle(service));
            debug!(service = name, "service registered");
            Ok(true)
        }
        Err(e) if e.code() == ERROR_SERVICE_DOES_NOT_EXIST.to_hresult() => Ok(false),
        Err(e) => Err(Error::Transport(format!("open service {name}: {e}"))),
    }
}
