//! Process builder for running external interpreters.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Output, Stdio};

use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug)]
pub struct Command {
    inner: StdCommand,
    program: String,
}

impl Command {
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            inner: StdCommand::new(&program),
            program,
        }
    }

    /// Build a command for `program` resolved through `PATH`. Absolute or
    /// relative paths that exist are used as given.
    pub fn resolve(program: impl Into<String>) -> Result<Self> {
        let program = program.into();
        let path = locate(&program)?;
        debug!(program = %program, path = %path.display(), "resolved interpreter");
        Ok(Self {
            inner: StdCommand::new(path),
            program,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.inner.arg(arg);
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.inner.args(args);
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.inner.current_dir(dir);
        self
    }

    /// Run to completion and capture both output streams. Stdin is closed.
    pub fn capture(mut self) -> Result<Output> {
        self.inner
            .stdin(Stdio::null())
            .output()
            .map_err(|e| Error::CommandFailed {
                cmd: self.program.clone(),
                source: e,
            })
    }
}

/// Resolve `program` the way a shell would.
pub fn locate(program: &str) -> Result<PathBuf> {
    let as_path = Path::new(program);
    if as_path.components().count() > 1 && as_path.is_file() {
        return Ok(as_path.to_path_buf());
    }
    which::which(program).map_err(|_| Error::CommandNotFound {
        cmd: program.to_string(),
    })
}
