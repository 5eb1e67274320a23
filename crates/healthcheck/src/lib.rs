//! Health metric engine for HAProxy resources.
//!
//! This crate turns raw HAProxy counters into monitoring plugin results:
//! - [`metrics`]: the catalog of 15 metrics and their formulas
//! - [`thresholds`]: warning/critical range parsing and classification
//! - [`report`]: headline and perfdata assembly
//! - [`check`]: the read, compute, reset, classify workflow
//!
//! # Example
//!
//! ```no_run
//! use haproxy_stats::HAProxy;
//! use healthcheck::{Check, CheckConfig, Overrides, ResourceMode};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let check = Check::new(CheckConfig {
//!     mode: ResourceMode::Backend,
//!     resource: "web-pool".to_string(),
//!     metric: "active_servers".to_string(),
//!     warning: "75:".to_string(),
//!     critical: "50:".to_string(),
//!     overrides: Overrides::default(),
//!     zero_counters: false,
//! })?;
//!
//! let haproxy = HAProxy::new("/var/run/haproxy.sock", Duration::from_secs(5));
//! let report = check.run(&haproxy).await?;
//! println!("{}", report.status_line());
//! std::process::exit(report.verdict.exit_code());
//! # }
//! ```

pub mod check;
pub mod error;
pub mod metrics;
pub mod report;
pub mod thresholds;
pub mod types;

pub use check::{Check, CheckConfig};
pub use error::{CheckError, Result};
pub use metrics::{MetricSpec, compute, lookup};
pub use report::{Evaluation, Report, summarize};
pub use thresholds::{ThresholdRange, Thresholds, classify, parse_range};
pub use types::{MetricResult, Overrides, ResourceHandle, ResourceMode, ValueKind, Verdict};
