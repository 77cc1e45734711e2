//! Read-only access to the platform signals Office detection relies on.
//!
//! # Architecture
//!
//! - `store.rs` - `ConfigStore`: registry values, management queries, service lookups
//! - `host.rs` - `HostProbe`: version resource, bitness, ARM marker, branding
//! - `memory.rs` - In-memory snapshot backend
//! - `win32/` - Live Windows backend
//! - `command.rs` - Process builder used for external scripts

pub use error::{Error, Result};
pub use host::{FileVersion, HostProbe};
pub use memory::MemoryPlatform;
pub use store::{ConfigStore, Hive, PropertyBag, View};

pub mod command;
mod error;
pub mod host;
pub mod memory;
pub mod store;
#[cfg(windows)]
pub mod win32;

/// Everything a resolver may ask of the machine.
pub trait Platform: ConfigStore + HostProbe {}

impl<T: ConfigStore + HostProbe + ?Sized> Platform for T {}

/// Connect to the live platform of the running host.
#[cfg(windows)]
pub fn native() -> Result<Box<dyn Platform>> {
    Ok(Box::new(win32::WindowsPlatform::connect()?))
}

/// Connect to the live platform of the running host.
#[cfg(not(windows))]
pub fn native() -> Result<Box<dyn Platform>> {
    Err(Error::Unsupported(format!(
        "live detection needs Windows, this host is {}",
        std::env::consts::OS
    )))
}
