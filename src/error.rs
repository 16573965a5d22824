//! Error types
//!
//! One error enum covers every recoverable failure a command handler
//! can hit. Command-level failures are answered with a status reply and
//! never terminate the session; only control-connection I/O errors do.

use std::fmt;
use std::io;

/// Failure modes of FTP command execution.
#[derive(Debug)]
pub enum FtpError {
    /// A path argument did not resolve to an existing file.
    NotFound,
    /// No port in the configured PASV range could be bound.
    BindFailed,
    /// No client connected to the data listener within the wait budget.
    NoDataConnection,
    /// A command arrived out of order (RNTO without RNFR).
    SequenceError,
    /// Filesystem or data-connection I/O failure mid-operation.
    Io(io::Error),
}

impl fmt::Display for FtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtpError::NotFound => write!(f, "file not found"),
            FtpError::BindFailed => write!(f, "no available port for data connection"),
            FtpError::NoDataConnection => write!(f, "timeout waiting for data connection"),
            FtpError::SequenceError => write!(f, "bad sequence of commands"),
            FtpError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for FtpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FtpError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FtpError {
    fn from(error: io::Error) -> Self {
        FtpError::Io(error)
    }
}
