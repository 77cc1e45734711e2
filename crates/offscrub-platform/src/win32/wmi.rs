//! Management queries through the WMI COM interfaces.

use tracing::{debug, trace};
use windows::Win32::System::Com::{
    CLSCTX_INPROC_SERVER, COINIT_MULTITHREADED, CoCreateInstance, CoInitializeEx,
    CoInitializeSecurity, EOAC_NONE, RPC_C_AUTHN_LEVEL_DEFAULT, RPC_C_IMP_LEVEL_IMPERSONATE,
};
use windows::Win32::System::Variant::VARIANT;
use windows::Win32::System::Wmi::{
    IEnumWbemClassObject, IWbemClassObject, IWbemLocator, WBEM_FLAG_FORWARD_ONLY,
    WBEM_FLAG_NONSYSTEM_ONLY, WBEM_FLAG_RETURN_IMMEDIATELY, WBEM_INFINITE, WBEM_S_NO_MORE_DATA,
    WbemLocator,
};
use windows::core::BSTR;

use super::handles::ComApartment;
use crate::store::PropertyBag;
use crate::{Error, Result};

fn transport(context: &str) -> impl Fn(windows::core::Error) -> Error + '_ {
    move |e| Error::Transport(format!("{context}: {e}"))
}

/// Enter a multithreaded COM apartment for the current thread.
pub(super) fn enter_apartment() -> Result<ComApartment> {
    unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) }
        .ok()
        .map_err(transport("COM initialization"))?;
    let apartment = ComApartment;

    // Fails harmlessly when the process already configured COM security.
    let _ = unsafe {
        CoInitializeSecurity(
            None,
            -1,
            None,
            None,
            RPC_C_AUTHN_LEVEL_DEFAULT,
            RPC_C_IMP_LEVEL_IMPERSONATE,
            None,
            EOAC_NONE,
            None,
        )
    };
    Ok(apartment)
}

/// Run a WQL query and collect every non-system property of every row.
/// Properties whose value cannot be rendered as text (`NULL`, arrays) are
/// left out of the row.
pub(super) fn query(namespace: &str, wql: &str) -> Result<Vec<PropertyBag>> {
    let _apartment = enter_apartment()?;

    let locator: IWbemLocator = unsafe { CoCreateInstance(&WbemLocator, None, CLSCTX_INPROC_SERVER) }
        .map_err(transport("create WMI locator"))?;
    let services = unsafe {
        locator.ConnectServer(
            &BSTR::from(namespace),
            &BSTR::new(),
            &BSTR::new(),
            &BSTR::new(),
            0,
            &BSTR::new(),
            None,
        )
    }
    .map_err(transport(namespace))?;

    let rows: IEnumWbemClassObject = unsafe {
        services.ExecQuery(
            &BSTR::from("WQL"),
            &BSTR::from(wql),
            WBEM_FLAG_FORWARD_ONLY | WBEM_FLAG_RETURN_IMMEDIATELY,
            None,
        )
    }
    .map_err(transport(wql))?;

    let mut out = Vec::new();
    loop {
        let mut slot = [None; 1];
        let mut returned = 0u32;
        unsafe { rows.Next(WBEM_INFINITE.0, &mut slot, &mut returned) }
            .ok()
            .map_err(transport(wql))?;
        let Some(row) = slot[0].take() else {
            break;
        };
        if returned == 0 {
            break;
        }
        out.push(properties(&row).map_err(transport(wql))?);
    }

    debug!(namespace, query = wql, rows = out.len(), "management query");
    Ok(out)
}

fn properties(row: &IWbemClassObject) -> windows::core::Result<PropertyBag> {
    let mut bag = PropertyBag::new();
    unsafe { row.BeginEnumeration(WBEM_FLAG_NONSYSTEM_ONLY.0) }?;
    loop {
        let mut name = BSTR::new();
        let mut value = VARIANT::default();
        let status = unsafe {
            row.Next(
                0,
                &mut name,
                &mut value,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        };
        if status.0 == WBEM_S_NO_MORE_DATA.0 {
            break;
        }
        status.ok()?;

        match BSTR::try_from(&value) {
            Ok(text) => {
                bag.insert(name.to_string(), text.to_string());
            }
            Err(_) => trace!(property = %name, "skipping non-text property"),
        }
    }
    unsafe { row.EndEnumeration() }?;
    Ok(bag)
}
