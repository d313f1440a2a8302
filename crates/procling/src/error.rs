//! Error types for process execution

use std::io;
use thiserror::Error;

use crate::process::Stream;

/// Process execution errors
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The executable could not be found or started
    #[error("failed to spawn process: {0}")]
    Spawn(#[source] io::Error),

    /// A pipe or signal syscall failed
    #[error("system error: {0}")]
    System(#[from] nix::Error),

    /// Waiting on the process failed
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// Invalid process configuration
    #[error("invalid process configuration: {0}")]
    InvalidConfig(String),

    /// Operation on a stream endpoint that has already been closed
    #[error("stream {0} is closed")]
    StreamClosed(Stream),

    /// The selected stream cannot be read by the parent
    #[error("stream {0} is not readable")]
    NotReadable(Stream),
}

impl ProcessError {
    /// The numeric platform error code behind this error, when one exists.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            ProcessError::Spawn(e) | ProcessError::Io(e) => e.raw_os_error(),
            ProcessError::System(errno) => Some(*errno as i32),
            ProcessError::InvalidConfig(_)
            | ProcessError::StreamClosed(_)
            | ProcessError::NotReadable(_) => None,
        }
    }
}

/// Result type for process operations
pub type Result<T> = std::result::Result<T, ProcessError>;
