//! Metric catalog and derivations.
//!
//! Each metric is a static [`MetricSpec`] entry: the modes it applies to, the
//! raw stats fields it reads, its unit and declared bounds, the message
//! template used in reports, and the formula turning counters into a value.
//! The catalog is resolved once per run; an unknown name or a metric that
//! does not apply to the selected mode fails before any counters are read.

use haproxy_stats::StatsSnapshot;
use tracing::debug;

use crate::error::{CheckError, Result};
use crate::types::{MetricResult, Overrides, ResourceHandle, ResourceMode, ValueKind};

use ResourceMode::{Backend, Frontend, Server};

const BYTES_PER_MEGABYTE: f64 = 1_048_576.0;

/// Response class counters making up the total for non-frontend modes.
const RESPONSE_CLASSES: [&str; 6] = [
    "hrsp_1xx",
    "hrsp_2xx",
    "hrsp_3xx",
    "hrsp_4xx",
    "hrsp_5xx",
    "hrsp_other",
];

/// Counters of a single resource, read from a snapshot.
pub struct MetricInput<'a> {
    snapshot: &'a StatsSnapshot,
    handle: &'a ResourceHandle,
}

impl<'a> MetricInput<'a> {
    pub fn new(snapshot: &'a StatsSnapshot, handle: &'a ResourceHandle) -> Self {
        Self { snapshot, handle }
    }

    fn counter(&self, field: &str) -> Result<f64> {
        Ok(self
            .snapshot
            .counter(self.handle.mode().kind(), self.handle.name(), field)?)
    }

    fn sum(&self, fields: &[&str]) -> Result<f64> {
        fields.iter().map(|field| self.counter(field)).sum()
    }
}

type Formula = fn(&MetricInput<'_>) -> Result<f64>;

/// Static description of one catalog metric.
pub struct MetricSpec {
    pub name: &'static str,
    pub modes: &'static [ResourceMode],
    /// Raw stats fields read by the formula
    pub fields: &'static [&'static str],
    pub unit: Option<&'static str>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub kind: ValueKind,
    /// Report message, `{value}` and `{uom}` are substituted
    pub template: &'static str,
    formula: Formula,
}

impl MetricSpec {
    pub fn supports(&self, mode: ResourceMode) -> bool {
        self.modes.contains(&mode)
    }

    /// Fail with `UnsupportedModeForMetric` unless the metric applies to `mode`.
    pub fn check_mode(&self, mode: ResourceMode) -> Result<()> {
        if self.supports(mode) {
            Ok(())
        } else {
            Err(CheckError::UnsupportedModeForMetric {
                metric: self.name.to_string(),
                mode,
            })
        }
    }

    /// Derive the metric for a resource.
    pub fn compute(
        &self,
        snapshot: &StatsSnapshot,
        handle: &ResourceHandle,
        overrides: Overrides,
    ) -> Result<MetricResult> {
        self.check_mode(handle.mode())?;

        let value = (self.formula)(&MetricInput::new(snapshot, handle))?;
        debug!(
            metric = self.name,
            mode = %handle.mode(),
            resource = handle.name(),
            value,
            "Computed metric"
        );

        Ok(MetricResult {
            name: self.name.to_string(),
            value,
            unit: self.unit.map(str::to_string),
            min: self.min,
            max: self.max,
            kind: self.kind,
        }
        .apply(overrides))
    }
}

const ANY_MODE: &[ResourceMode] = &[Frontend, Backend, Server];
const PCT: Option<&str> = Some("%");
const MS: Option<&str> = Some("ms");
const MB: Option<&str> = Some("MB");
const COUNTER: Option<&str> = Some("c");

static CATALOG: [MetricSpec; 15] = [
    MetricSpec {
        name: "active_servers",
        modes: &[Backend],
        fields: &["status"],
        unit: PCT,
        min: Some(0.0),
        max: Some(100.0),
        kind: ValueKind::Decimal,
        template: "{value}{uom} of all servers available are active",
        formula: active_servers,
    },
    MetricSpec {
        name: "http_4XX_pct",
        modes: ANY_MODE,
        fields: &[
            "req_tot",
            "hrsp_1xx",
            "hrsp_2xx",
            "hrsp_3xx",
            "hrsp_4xx",
            "hrsp_5xx",
            "hrsp_other",
        ],
        unit: PCT,
        min: Some(0.0),
        max: Some(100.0),
        kind: ValueKind::Decimal,
        template: "{value}{uom} of all requests returned HTTP 4XX",
        formula: http_4xx_pct,
    },
    MetricSpec {
        name: "http_5XX_pct",
        modes: ANY_MODE,
        fields: &[
            "req_tot",
            "hrsp_1xx",
            "hrsp_2xx",
            "hrsp_3xx",
            "hrsp_4xx",
            "hrsp_5xx",
            "hrsp_other",
        ],
        unit: PCT,
        min: Some(0.0),
        max: Some(100.0),
        kind: ValueKind::Decimal,
        template: "{value}{uom} of all requests returned HTTP 5XX or undef",
        formula: http_5xx_pct,
    },
    MetricSpec {
        name: "session_capacity_pct",
        modes: ANY_MODE,
        fields: &["scur", "slim"],
        unit: PCT,
        min: Some(0.0),
        max: Some(100.0),
        kind: ValueKind::Decimal,
        template: "Operating at {value}{uom} of maximum session capacity",
        formula: session_capacity_pct,
    },
    MetricSpec {
        name: "session_rate_capacity_pct",
        modes: &[Frontend],
        fields: &["rate_max"],
        unit: PCT,
        min: Some(0.0),
        max: Some(100.0),
        kind: ValueKind::Decimal,
        template: "Session rate reached {value}{uom}",
        formula: session_rate_capacity_pct,
    },
    MetricSpec {
        name: "average_response_time",
        modes: &[Backend],
        fields: &["rtime"],
        unit: MS,
        min: Some(0.0),
        max: None,
        kind: ValueKind::Count,
        template: "Average response time at {value}{uom}",
        formula: |input| input.counter("rtime"),
    },
    MetricSpec {
        name: "total_megabytes_in",
        modes: ANY_MODE,
        fields: &["bin"],
        unit: MB,
        min: Some(0.0),
        max: None,
        kind: ValueKind::Decimal,
        template: "{value}{uom} received in total",
        formula: |input| Ok(round2(input.counter("bin")? / BYTES_PER_MEGABYTE)),
    },
    MetricSpec {
        name: "total_megabytes_out",
        modes: ANY_MODE,
        fields: &["bout"],
        unit: MB,
        min: Some(0.0),
        max: None,
        kind: ValueKind::Decimal,
        template: "{value}{uom} sent in total",
        formula: |input| Ok(round2(input.counter("bout")? / BYTES_PER_MEGABYTE)),
    },
    MetricSpec {
        name: "error_requests",
        modes: &[Frontend],
        fields: &["ereq"],
        unit: COUNTER,
        min: Some(0.0),
        max: None,
        kind: ValueKind::Count,
        template: "Got {value} bad requests (disconnect,timeout,ACL hit etc.) from clients",
        formula: |input| input.counter("ereq"),
    },
    // dreq is a subset of ereq on frontends.
    MetricSpec {
        name: "denied_requests",
        modes: &[Frontend, Backend],
        fields: &["dreq"],
        unit: COUNTER,
        min: Some(0.0),
        max: None,
        kind: ValueKind::Count,
        template: "Discarded {value} requests due to ACL hits (subset of error_requests)",
        formula: |input| input.counter("dreq"),
    },
    MetricSpec {
        name: "backend_failures",
        modes: &[Backend, Server],
        fields: &["econ", "eresp"],
        unit: COUNTER,
        min: Some(0.0),
        max: None,
        kind: ValueKind::Count,
        template: "Counted {value} errors for this resource",
        formula: |input| input.sum(&["econ", "eresp"]),
    },
    MetricSpec {
        name: "queue_capacity_pct",
        modes: &[Backend, Server],
        fields: &["qcur", "qmax"],
        unit: PCT,
        min: Some(0.0),
        max: None,
        kind: ValueKind::Decimal,
        template: "Queue is at {value}{uom} of maximum capacity",
        formula: queue_capacity_pct,
    },
    // HAProxy averages qtime over the last 1024 requests.
    MetricSpec {
        name: "queue_time",
        modes: &[Backend, Server],
        fields: &["qtime"],
        unit: MS,
        min: Some(0.0),
        max: None,
        kind: ValueKind::Count,
        template: "Average time spent in queue is {value}{uom} for the last 1024 requests",
        formula: |input| input.counter("qtime"),
    },
    MetricSpec {
        name: "new_sessions",
        modes: ANY_MODE,
        fields: &["rate"],
        unit: COUNTER,
        min: Some(0.0),
        max: None,
        kind: ValueKind::Count,
        template: "Counted {value} new sessions during previous second",
        formula: |input| input.counter("rate"),
    },
    MetricSpec {
        name: "new_requests",
        modes: &[Frontend],
        fields: &["req_rate"],
        unit: COUNTER,
        min: Some(0.0),
        max: None,
        kind: ValueKind::Count,
        template: "Counted {value} requests during previous second",
        formula: |input| input.counter("req_rate"),
    },
];

/// All catalog metrics, in help-text order.
pub fn catalog() -> &'static [MetricSpec] {
    &CATALOG
}

/// Comma separated metric names, for help text and error hints.
pub fn metric_names() -> String {
    CATALOG
        .iter()
        .map(|spec| spec.name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Find a metric by name, failing with `UnsupportedMetric`.
pub fn lookup(name: &str) -> Result<&'static MetricSpec> {
    CATALOG
        .iter()
        .find(|spec| spec.name == name)
        .ok_or_else(|| CheckError::UnsupportedMetric(name.to_string()))
}

/// Compute the named metric for a resource.
pub fn compute(
    name: &str,
    snapshot: &StatsSnapshot,
    handle: &ResourceHandle,
    overrides: Overrides,
) -> Result<MetricResult> {
    lookup(name)?.compute(snapshot, handle, overrides)
}

/// Round half to even at two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn percentage(part: f64, total: f64) -> f64 {
    round2(part / total * 100.0)
}

fn active_servers(input: &MetricInput<'_>) -> Result<f64> {
    let backend = input.handle.name();
    let servers = input.snapshot.backend_servers(backend);
    if servers.is_empty() {
        return Err(CheckError::EmptyBackend(backend.to_string()));
    }

    let up = servers.iter().filter(|s| s.status == "UP").count();
    Ok(percentage(up as f64, servers.len() as f64))
}

/// Total responses: `req_tot` on frontends, the response classes elsewhere.
/// A zero total is replaced by 1 so idle resources report 0%.
fn response_total(input: &MetricInput<'_>) -> Result<f64> {
    let total = match input.handle.mode() {
        Frontend => input.counter("req_tot")?,
        Backend | Server => input.sum(&RESPONSE_CLASSES)?,
    };
    Ok(if total == 0.0 { 1.0 } else { total })
}

fn http_4xx_pct(input: &MetricInput<'_>) -> Result<f64> {
    let total = response_total(input)?;
    Ok(percentage(input.counter("hrsp_4xx")?, total))
}

fn http_5xx_pct(input: &MetricInput<'_>) -> Result<f64> {
    let total = response_total(input)?;
    Ok(percentage(input.sum(&["hrsp_5xx", "hrsp_other"])?, total))
}

fn session_capacity_pct(input: &MetricInput<'_>) -> Result<f64> {
    let limit = input.counter("slim")?;
    if limit == 0.0 {
        return Err(CheckError::NoLimitConfigured("session limit"));
    }
    Ok(percentage(input.counter("scur")?, limit))
}

/// Highest observed session rate against the global `SessRateLimit`.
fn session_rate_capacity_pct(input: &MetricInput<'_>) -> Result<f64> {
    let limit = input.snapshot.session_rate_limit();
    if limit == 0.0 {
        return Err(CheckError::NoLimitConfigured("session rate limit"));
    }
    Ok(percentage(input.counter("rate_max")?, limit))
}

fn queue_capacity_pct(input: &MetricInput<'_>) -> Result<f64> {
    let limit = input.counter("qmax")?;
    if limit == 0.0 {
        return Err(CheckError::NoLimitConfigured("queue limit"));
    }
    Ok(percentage(input.counter("qcur")?, limit))
}
