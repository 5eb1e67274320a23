//! Monitoring plugin checking the health of an HAProxy instance.
//!
//! One invocation checks one metric of one frontend, backend or server and
//! prints a single status line with performance data:
//!
//! ```text
//! OK - Backend "web-pool" reports: 75.0% of all servers available are active | active_servers=75.0%;50:;25:;0;100
//! ```
//!
//! The exit code is 0, 1, 2 or 3 for OK, WARNING, CRITICAL and UNKNOWN.

pub mod cli;
pub mod config;
pub mod scan;

pub use cli::{Args, Selection};
pub use config::{Config, ConfigError, LogFormat, Settings, SocketTarget};

use haproxy_stats::{HAProxy, StatsSource};
use healthcheck::{Check, CheckConfig, Overrides, Report, ResourceMode, Verdict};
use tracing::{debug, info};

/// Text for stdout and the process exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginOutput {
    pub text: String,
    pub exit_code: u8,
}

impl PluginOutput {
    /// Status line, followed by one line per metric when `verbosity >= 1`.
    pub fn from_report(report: &Report, verbosity: u8) -> Self {
        let mut lines = vec![report.status_line()];
        if verbosity >= 1 {
            lines.extend(report.details.iter().cloned());
        }
        Self {
            text: lines.join("\n"),
            exit_code: exit_code(report.verdict),
        }
    }

    pub fn scan(listing: String) -> Self {
        Self {
            text: listing.trim_end().to_string(),
            exit_code: exit_code(Verdict::Ok),
        }
    }

    /// Any error that ends a run before a verdict: `UNKNOWN - <message>`.
    pub fn fatal(error: impl std::fmt::Display) -> Self {
        Self::from_report(&Report::fatal(error.to_string()), 0)
    }
}

fn exit_code(verdict: Verdict) -> u8 {
    // 0..=3
    verdict.exit_code() as u8
}

/// Initialize stderr logging for a run.
pub fn init_logging(settings: &Settings) -> common::Result<()> {
    match settings.log_format {
        LogFormat::Text => common::logging::init(settings.log_level()),
        LogFormat::Json => common::logging::init_json(settings.log_level()),
    }
}

/// Run the selected check or scan with the given settings.
pub async fn run(args: &Args, settings: &Settings) -> anyhow::Result<PluginOutput> {
    match args.target.selection() {
        Selection::Scan => {
            let source = connect(settings)?;
            run_scan(&source).await
        }
        Selection::Resource { mode, name } => {
            // Ranges and metric are validated before touching the sockets
            let check = Check::new(check_config(args, settings, mode, name))?;
            let source = connect(settings)?;
            run_check(&check, &source, settings.verbosity).await
        }
    }
}

pub async fn run_scan<S>(source: &S) -> anyhow::Result<PluginOutput>
where
    S: StatsSource + ?Sized,
{
    let snapshot = source.snapshot().await?;
    Ok(PluginOutput::scan(scan::render(&snapshot)))
}

pub async fn run_check<S>(check: &Check, source: &S, verbosity: u8) -> anyhow::Result<PluginOutput>
where
    S: StatsSource + ?Sized,
{
    let report = check.run(source).await?;
    Ok(PluginOutput::from_report(&report, verbosity))
}

fn check_config(args: &Args, settings: &Settings, mode: ResourceMode, name: String) -> CheckConfig {
    CheckConfig {
        mode,
        resource: name,
        metric: args.metric.clone().unwrap_or_default(),
        warning: args.warning.clone(),
        critical: args.critical.clone(),
        overrides: Overrides {
            min: args.min,
            max: args.max,
        },
        zero_counters: settings.zero_counters,
    }
}

fn connect(settings: &Settings) -> haproxy_stats::Result<HAProxy> {
    let haproxy = match &settings.target {
        SocketTarget::File(path) => HAProxy::new(path.clone(), settings.timeout),
        SocketTarget::Dir(dir) => HAProxy::from_socket_dir(dir, settings.timeout)?,
    };
    info!(sockets = haproxy.sockets().len(), "Using HAProxy admin sockets");
    debug!(timeout = ?settings.timeout, "Socket timeout");
    Ok(haproxy)
}
