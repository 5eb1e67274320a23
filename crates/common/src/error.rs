//! Common error types for check_haproxy_health components.

use std::fmt;

/// A specialized Result type for shared operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for shared operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Socket error: {0}")]
    Socket(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Logging error: {0}")]
    Logging(String),
}

impl Error {
    /// Create a new socket error.
    pub fn socket(msg: impl fmt::Display) -> Self {
        Error::Socket(msg.to_string())
    }

    /// Create a new protocol error.
    pub fn protocol(msg: impl fmt::Display) -> Self {
        Error::Protocol(msg.to_string())
    }
}
