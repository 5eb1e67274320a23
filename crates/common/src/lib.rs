//! Common utilities and types shared across the check_haproxy_health crates.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
