//! Check error taxonomy. Every variant ends the run with an UNKNOWN status.

use crate::types::ResourceMode;
use haproxy_stats::StatsError;

/// A specialized Result type for check operations.
pub type Result<T> = std::result::Result<T, CheckError>;

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("{} \"{name}\" was not found. Use --scan to check for resources available.", .mode.title())]
    ResourceNotFound { mode: ResourceMode, name: String },

    #[error("Metric \"{0}\" not found. Use --help to check for metrics available.")]
    UnsupportedMetric(String),

    #[error("\"{metric}\" is not a valid metric for mode {mode}")]
    UnsupportedModeForMetric { metric: String, mode: ResourceMode },

    /// A limit the metric divides by is 0; names the HAProxy setting to fix.
    #[error("No {0} defined in haproxy config.")]
    NoLimitConfigured(&'static str),

    #[error("Backend \"{0}\" does not contain any servers")]
    EmptyBackend(String),

    #[error("Invalid range specification \"{spec}\": {reason}")]
    InvalidRangeSpec { spec: String, reason: String },

    #[error(transparent)]
    Stats(#[from] StatsError),
}
