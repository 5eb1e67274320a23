//! Core check types.

use haproxy_stats::{ResourceKind, StatsSnapshot};
use std::fmt;

use crate::error::{CheckError, Result};

/// Kind of resource a check runs against. Exactly one per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceMode {
    Frontend,
    Backend,
    Server,
}

impl ResourceMode {
    pub const ALL: [ResourceMode; 3] = [
        ResourceMode::Frontend,
        ResourceMode::Backend,
        ResourceMode::Server,
    ];

    /// Stats row kind this mode reads from.
    pub fn kind(self) -> ResourceKind {
        match self {
            ResourceMode::Frontend => ResourceKind::Frontend,
            ResourceMode::Backend => ResourceKind::Backend,
            ResourceMode::Server => ResourceKind::Server,
        }
    }

    /// Capitalized name used in report headlines.
    pub fn title(self) -> &'static str {
        match self {
            ResourceMode::Frontend => "Frontend",
            ResourceMode::Backend => "Backend",
            ResourceMode::Server => "Server",
        }
    }
}

impl fmt::Display for ResourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind())
    }
}

/// A named resource verified to exist in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    mode: ResourceMode,
    name: String,
}

impl ResourceHandle {
    /// Resolve `name` in `snapshot`, failing with `ResourceNotFound`.
    pub fn resolve(snapshot: &StatsSnapshot, mode: ResourceMode, name: &str) -> Result<Self> {
        if !snapshot.contains(mode.kind(), name) {
            return Err(CheckError::ResourceNotFound {
                mode,
                name: name.to_string(),
            });
        }
        Ok(Self {
            mode,
            name: name.to_string(),
        })
    }

    pub fn mode(&self) -> ResourceMode {
        self.mode
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Health classification, mapped to plugin exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Verdict {
    /// Ranking used to pick the overall verdict: Critical > Warning > Unknown > Ok.
    pub fn severity(self) -> u8 {
        match self {
            Verdict::Ok => 0,
            Verdict::Unknown => 1,
            Verdict::Warning => 2,
            Verdict::Critical => 3,
        }
    }

    /// Monitoring plugin exit code.
    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::Ok => 0,
            Verdict::Warning => 1,
            Verdict::Critical => 2,
            Verdict::Unknown => 3,
        }
    }

    /// Most severe verdict of a sequence, `None` if it is empty.
    pub fn worst(verdicts: impl IntoIterator<Item = Verdict>) -> Option<Verdict> {
        verdicts.into_iter().max_by_key(|v| v.severity())
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Ok => write!(f, "OK"),
            Verdict::Warning => write!(f, "WARNING"),
            Verdict::Critical => write!(f, "CRITICAL"),
            Verdict::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// How a metric value is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Raw counters and times, rendered without a fractional part
    Count,
    /// Derived values, rendered with at least one decimal (`75.0`)
    Decimal,
}

/// Operator overrides for the declared perfdata bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overrides {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// One computed metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricResult {
    pub name: String,
    pub value: f64,
    pub unit: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub kind: ValueKind,
}

impl MetricResult {
    /// Value as it appears in messages and perfdata.
    pub fn display_value(&self) -> String {
        match self.kind {
            ValueKind::Count => format!("{}", self.value),
            ValueKind::Decimal => format!("{:?}", self.value),
        }
    }

    pub fn unit(&self) -> &str {
        self.unit.as_deref().unwrap_or("")
    }

    /// Replace the declared bounds with operator supplied ones.
    pub fn apply(mut self, overrides: Overrides) -> Self {
        if overrides.min.is_some() {
            self.min = overrides.min;
        }
        if overrides.max.is_some() {
            self.max = overrides.max;
        }
        self
    }
}
