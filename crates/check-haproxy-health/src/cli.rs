//! Command-line interface.

use clap::{ArgAction, Args as ClapArgs, Parser};
use healthcheck::ResourceMode;
use std::path::PathBuf;

/// Check plugin for monitoring a haproxy instance.
///
/// Output follows the monitoring plugin guidelines: one status line with
/// performance data, exit code 0/1/2/3 for OK/WARNING/CRITICAL/UNKNOWN.
#[derive(Parser, Debug, Clone)]
#[command(name = "check_haproxy_health", version)]
pub struct Args {
    /// Return warning if the metric is outside RANGE, e.g. 5:25, :30 or 95:
    #[arg(
        short,
        long,
        value_name = "RANGE",
        default_value = "",
        allow_hyphen_values = true
    )]
    pub warning: String,

    /// Return critical if the metric is outside RANGE, e.g. 5:25, :30 or 95:
    #[arg(
        short,
        long,
        value_name = "RANGE",
        default_value = "",
        allow_hyphen_values = true
    )]
    pub critical: String,

    /// Path to directory containing haproxy sockets (one per process)
    #[arg(short = 's', long = "socketdir", value_name = "DIR")]
    pub socket_dir: Option<PathBuf>,

    /// Path to haproxy socketfile [default: /var/run/haproxy.sock]
    #[arg(short = 'f', long = "socketfile", value_name = "FILE")]
    pub socket_file: Option<PathBuf>,

    #[command(flatten)]
    pub target: Target,

    /// Metric to check
    #[arg(long, required_unless_present = "scan", help = metric_help())]
    pub metric: Option<String>,

    /// Minimum value for performance data
    #[arg(long, allow_hyphen_values = true)]
    pub min: Option<f64>,

    /// Maximum value for performance data
    #[arg(long, allow_hyphen_values = true)]
    pub max: Option<f64>,

    /// Increase output verbosity (use up to 3 times)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Do not zero out stat counters after every run
    #[arg(long)]
    pub nozerocounters: bool,

    /// Configuration file (default: search standard locations)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Socket connect/read timeout in seconds
    #[arg(
        short = 't',
        long,
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..=300)
    )]
    pub timeout: Option<u64>,
}

/// Resource selection: exactly one of these.
#[derive(ClapArgs, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct Target {
    /// Name of frontend, use --scan to check for resources available
    #[arg(long)]
    pub frontend: Option<String>,

    /// Name of backend, use --scan to check for resources available
    #[arg(long)]
    pub backend: Option<String>,

    /// Name of server (or backend/server), use --scan to check for resources available
    #[arg(long)]
    pub server: Option<String>,

    /// Show haproxy resources available (frontend, backend and server)
    #[arg(long)]
    pub scan: bool,
}

/// What a run does, decided once from the arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Scan,
    Resource { mode: ResourceMode, name: String },
}

impl Target {
    pub fn selection(&self) -> Selection {
        if self.scan {
            return Selection::Scan;
        }
        let (mode, name) = match (&self.frontend, &self.backend, &self.server) {
            (Some(name), _, _) => (ResourceMode::Frontend, name),
            (_, Some(name), _) => (ResourceMode::Backend, name),
            (_, _, Some(name)) => (ResourceMode::Server, name),
            // clap enforces that one member of the group is present
            (None, None, None) => return Selection::Scan,
        };
        Selection::Resource {
            mode,
            name: name.clone(),
        }
    }
}

fn metric_help() -> String {
    format!("Supported keywords: {}", healthcheck::metrics::metric_names())
}
