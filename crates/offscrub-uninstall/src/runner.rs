use std::path::Path;

use offscrub_platform::command::Command;
use tracing::debug;

/// Outcome of one script run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptResult {
    pub has_error: bool,
    pub output: String,
    pub error: String,
}

impl ScriptResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            has_error: false,
            output: output.into(),
            error: String::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            has_error: true,
            output: String::new(),
            error: error.into(),
        }
    }

    /// Text recorded in the job log for this run.
    pub fn log_text(&self) -> &str {
        if self.has_error {
            &self.error
        } else {
            &self.output
        }
    }
}

/// Runs `<interpreter> <script> <args...>` to completion. Implementations
/// report failures in the result instead of returning errors.
pub trait ScriptRunner {
    fn run(&self, interpreter: &str, script: &Path, args: &[&str]) -> ScriptResult;
}

/// Spawns the interpreter as a child process and waits for it. There is no
/// timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ScriptRunner for ProcessRunner {
    fn run(&self, interpreter: &str, script: &Path, args: &[&str]) -> ScriptResult {
        let command = match Command::resolve(interpreter) {
            Ok(command) => command,
            Err(e) => return ScriptResult::failure(e.to_string()),
        };
        let workdir = script.parent().unwrap_or_else(|| Path::new("."));

        let output = match command
            .arg(script)
            .args(args)
            .current_dir(workdir)
            .capture()
        {
            Ok(output) => output,
            Err(e) => return ScriptResult::failure(e.to_string()),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        debug!(script = %script.display(), status = %output.status, "script finished");

        if output.status.success() {
            return ScriptResult::success(stdout);
        }
        let error = if stderr.trim().is_empty() {
            format!("{interpreter} exited with {}\n{stdout}", output.status)
        } else {
            stderr
        };
        ScriptResult {
            has_error: true,
            output: stdout,
            error,
        }
    }
}
