//! Office removal through the bundled scrub scripts.
//!
//! # Architecture
//!
//! - `plan.rs` - Product to script table
//! - `runner.rs` - Script execution seam and the process-backed runner
//! - `scratch.rs` - Per-job scratch directory, removed on drop
//! - `job.rs` - Sequential execution and the banner log
//! - `orchestrator.rs` - Bundle extraction and the public entry points

pub use error::{Error, Result};
pub use job::{BANNER, JobLog, UninstallJob};
pub use orchestrator::{DEFAULT_INTERPRETER, Uninstaller};
pub use plan::{ScriptPlan, ScriptStep};
pub use runner::{ProcessRunner, ScriptResult, ScriptRunner};
pub use scratch::ScratchDir;

mod error;
pub mod job;
pub mod orchestrator;
pub mod plan;
pub mod runner;
pub mod scratch;
