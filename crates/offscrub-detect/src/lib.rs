//! Windows and Office resolution over platform probes.
//!
//! # Architecture
//!
//! - `candidate.rs` - Ordered `(probe, outcome)` evaluation
//! - `keys.rs` - Registry locations, queries and thresholds
//! - `os.rs` - Windows product name, build, server and support checks
//! - `arch.rs` - OS and Office architecture
//! - `office.rs` - Office product identity, generation and install path
//! - `report.rs` - One-shot `DetectionReport`
//!
//! Every call re-reads the platform. Nothing is cached between calls, so
//! repeated resolution against unchanged state gives the same answer.

pub use arch::ArchitectureTag;
pub use error::{DetectionFault, Result, UnknownArchitecture, UnknownProduct};
pub use office::{InstallMechanism, InstallationRecord, ProductId};
pub use os::{OsInfo, OsName};
pub use report::{DetectionReport, OfficeReport};

pub mod arch;
pub mod candidate;
mod error;
pub mod keys;
pub mod office;
pub mod os;
pub mod report;

use offscrub_platform::Platform;

/// Resolver entry point over a borrowed platform.
pub struct Detector<'a, P: Platform + ?Sized> {
    platform: &'a P,
}

impl<'a, P: Platform + ?Sized> Detector<'a, P> {
    pub fn new(platform: &'a P) -> Self {
        Self { platform }
    }

    pub fn platform(&self) -> &'a P {
        self.platform
    }
}
