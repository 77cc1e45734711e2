use std::fmt::Write as _;

use tracing::{info, warn};

use crate::plan::ScriptPlan;
use crate::runner::ScriptRunner;
use crate::scratch::ScratchDir;

pub const BANNER: &str = "----------------------------------------";

/// Banner-delimited record of every script run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct JobLog {
    text: String,
}

impl JobLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(&mut self, title: &str, body: &str) {
        let _ = writeln!(self.text, "{BANNER}");
        let _ = writeln!(self.text, "{title}");
        let _ = writeln!(self.text, "{BANNER}");
        let _ = writeln!(self.text, "{body}");
    }

    /// Close with a final banner and no trailing newline.
    pub fn finish(mut self) -> String {
        self.text.push_str(BANNER);
        self.text
    }
}

/// One extraction plus the scripts that run from it. The scratch directory
/// goes away with the job.
pub struct UninstallJob {
    scratch: ScratchDir,
    plan: ScriptPlan,
}

impl UninstallJob {
    pub fn new(scratch: ScratchDir, plan: ScriptPlan) -> Self {
        Self { scratch, plan }
    }

    /// Run every step in order and return the log. Failing steps are
    /// recorded and the remaining steps still run.
    pub fn execute<R: ScriptRunner + ?Sized>(self, runner: &R, interpreter: &str) -> String {
        let Self { scratch, plan } = self;
        let mut log = JobLog::new();
        for step in &plan.steps {
            let script = scratch.join(step.script);
            info!(script = step.script, product = %plan.product, "running removal script");

            let result = runner.run(interpreter, &script, &step.arguments());
            if result.has_error {
                warn!(script = step.script, error = %result.error.trim(), "removal script reported an error");
            }
            log.section(step.title, result.log_text());
        }

        let path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            warn!(path = %path.display(), error = %e, "failed to remove scratch directory");
        }
        log.finish()
    }
}
