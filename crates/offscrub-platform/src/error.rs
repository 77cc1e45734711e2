use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A probe found nothing. Callers treat this as a negative signal.
    #[error("not available: {0}")]
    NotAvailable(String),

    /// The management query engine could not be reached or refused the query.
    #[error("management query transport failed: {0}")]
    Transport(String),

    #[error("invalid snapshot: {0}")]
    Snapshot(String),

    #[error("unsupported platform: {0}")]
    Unsupported(String),

    #[error("malformed value at {location}: {reason}")]
    MalformedValue { location: String, reason: String },

    #[error("command not found: {cmd}")]
    CommandNotFound { cmd: String },

    #[error("command failed: {cmd}, source: {source}")]
    CommandFailed { cmd: String, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub fn is_not_available(&self) -> bool {
        matches!(self, Self::NotAvailable(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
