//! Logging utilities for check_haproxy_health components.
//!
//! Everything is written to stderr: stdout belongs to the monitoring plugin
//! output contract.

use crate::{Error, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Map a `-v` count to a default filter directive.
///
/// The first `-v` only adds detail lines to the plugin output, so logging
/// stays at `warn` until the second.
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 | 1 => "warn",
        2 => "debug",
        _ => "trace",
    }
}

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize tracing with a human readable formatter.
///
/// Uses the RUST_LOG environment variable to control log levels, falling back
/// to `default_level`.
pub fn init(default_level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter(default_level))
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

/// Initialize tracing with JSON formatting (useful for structured logging).
pub fn init_json(default_level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .with(filter(default_level))
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
