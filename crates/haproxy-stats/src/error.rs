//! Errors raised while reading or querying HAProxy stats.

use crate::types::ResourceKind;
use std::path::PathBuf;

/// A specialized Result type for stats operations.
pub type Result<T> = std::result::Result<T, StatsError>;

/// Stats source error.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// Socket or protocol failure talking to HAProxy
    #[error(transparent)]
    Transport(#[from] common::Error),

    #[error("no stats sockets found in {}", .0.display())]
    NoSockets(PathBuf),

    #[error("{kind} \"{name}\" not found")]
    ResourceNotFound { kind: ResourceKind, name: String },

    #[error("field \"{field}\" is not reported for {kind} \"{name}\"")]
    UnknownField {
        kind: ResourceKind,
        name: String,
        field: String,
    },

    #[error("field \"{field}\" of {kind} \"{name}\" is not numeric: \"{value}\"")]
    InvalidValue {
        kind: ResourceKind,
        name: String,
        field: String,
        value: String,
    },
}
