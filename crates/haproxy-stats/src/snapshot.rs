//! Point-in-time view of the counters of one or more HAProxy processes.

use crate::error::{Result, StatsError};
use crate::types::{Info, ResourceKind, RowType, ServerStatus, StatRow};
use tracing::debug;

/// Fields that hold averages, merged across processes by mean instead of sum.
const AVERAGED_FIELDS: &[&str] = &["qtime", "ctime", "rtime", "ttime"];

/// Fields that identify a row or describe configuration, never combined.
const IDENTITY_FIELDS: &[&str] = &[
    "pxname",
    "svname",
    "pid",
    "iid",
    "sid",
    "type",
    "lastchg",
    "check_code",
    "check_duration",
];

/// Parsed `show info` and `show stat` of a HAProxy instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsSnapshot {
    info: Info,
    session_rate_limit: f64,
    frontends: Vec<StatRow>,
    backends: Vec<StatRow>,
    servers: Vec<StatRow>,
}

impl StatsSnapshot {
    /// Build a snapshot from one process' responses. Listener rows are dropped.
    pub fn from_parts(info: Info, rows: Vec<StatRow>) -> Self {
        let session_rate_limit = info.session_rate_limit();
        let mut snapshot = Self {
            info,
            session_rate_limit,
            ..Self::default()
        };

        for row in rows {
            match row.row_type {
                RowType::Frontend => snapshot.frontends.push(row),
                RowType::Backend => snapshot.backends.push(row),
                RowType::Server => snapshot.servers.push(row),
                RowType::Listener => {}
            }
        }

        snapshot
    }

    /// Combine snapshots taken from several processes of the same instance.
    ///
    /// Counters are summed, averages are averaged and text fields come from
    /// the first process reporting the row.
    pub fn merge(snapshots: Vec<StatsSnapshot>) -> Self {
        let mut iter = snapshots.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };
        let rest: Vec<StatsSnapshot> = iter.collect();
        if rest.is_empty() {
            return first;
        }

        debug!(processes = rest.len() + 1, "Merging stats from multiple processes");

        let session_rate_limit =
            first.session_rate_limit + rest.iter().map(|s| s.session_rate_limit).sum::<f64>();

        Self {
            frontends: merge_rows(&first.frontends, rest.iter().map(|s| &s.frontends)),
            backends: merge_rows(&first.backends, rest.iter().map(|s| &s.backends)),
            servers: merge_rows(&first.servers, rest.iter().map(|s| &s.servers)),
            info: first.info.clone(),
            session_rate_limit,
        }
    }

    /// Node name reported by `show info`.
    pub fn node_name(&self) -> &str {
        self.info.node_name()
    }

    /// Global session rate limit (`SessRateLimit`), 0 when not configured.
    pub fn session_rate_limit(&self) -> f64 {
        self.session_rate_limit
    }

    pub fn list_frontends(&self) -> Vec<&str> {
        self.frontends.iter().map(|r| r.proxy.as_str()).collect()
    }

    pub fn list_backends(&self) -> Vec<&str> {
        self.backends.iter().map(|r| r.proxy.as_str()).collect()
    }

    /// Server names in stats order. A name may repeat across backends.
    pub fn list_servers(&self) -> Vec<&str> {
        self.servers.iter().map(|r| r.service.as_str()).collect()
    }

    /// Whether the named resource exists.
    pub fn contains(&self, kind: ResourceKind, name: &str) -> bool {
        self.row(kind, name).is_some()
    }

    /// Look up a resource row.
    ///
    /// Servers are addressed either by bare name (first match in stats order)
    /// or as `backend/server`.
    pub fn row(&self, kind: ResourceKind, name: &str) -> Option<&StatRow> {
        match kind {
            ResourceKind::Frontend => self.frontends.iter().find(|r| r.proxy == name),
            ResourceKind::Backend => self.backends.iter().find(|r| r.proxy == name),
            ResourceKind::Server => match name.split_once('/') {
                Some((backend, server)) => self
                    .servers
                    .iter()
                    .find(|r| r.proxy == backend && r.service == server),
                None => self.servers.iter().find(|r| r.service == name),
            },
        }
    }

    /// Numeric value of a counter. Empty cells read as 0.
    pub fn counter(&self, kind: ResourceKind, name: &str, field: &str) -> Result<f64> {
        let row = self.row(kind, name).ok_or_else(|| StatsError::ResourceNotFound {
            kind,
            name: name.to_string(),
        })?;
        let raw = row.field(field).ok_or_else(|| StatsError::UnknownField {
            kind,
            name: name.to_string(),
            field: field.to_string(),
        })?;
        parse_number(raw).ok_or_else(|| StatsError::InvalidValue {
            kind,
            name: name.to_string(),
            field: field.to_string(),
            value: raw.to_string(),
        })
    }

    /// Status string of a resource.
    pub fn status(&self, kind: ResourceKind, name: &str) -> Result<&str> {
        self.row(kind, name)
            .map(StatRow::status)
            .ok_or_else(|| StatsError::ResourceNotFound {
                kind,
                name: name.to_string(),
            })
    }

    /// Member servers of a backend with their status, in stats order.
    pub fn backend_servers(&self, backend: &str) -> Vec<ServerStatus> {
        self.servers
            .iter()
            .filter(|r| r.proxy == backend)
            .map(|r| ServerStatus {
                name: r.service.clone(),
                status: r.status().to_string(),
            })
            .collect()
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0.0);
    }
    raw.parse().ok()
}

fn merge_rows<'a>(
    rows: &[StatRow],
    others: impl Iterator<Item = &'a Vec<StatRow>> + Clone,
) -> Vec<StatRow> {
    rows.iter()
        .map(|row| {
            let peers: Vec<&StatRow> = others
                .clone()
                .filter_map(|other| {
                    other
                        .iter()
                        .find(|r| r.proxy == row.proxy && r.service == row.service)
                })
                .collect();
            merge_row(row, &peers)
        })
        .collect()
}

fn merge_row(row: &StatRow, peers: &[&StatRow]) -> StatRow {
    if peers.is_empty() {
        return row.clone();
    }

    let mut merged = row.clone();
    for (field, value) in merged.fields.iter_mut() {
        if IDENTITY_FIELDS.contains(&field.as_str()) {
            continue;
        }
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        let Ok(first) = trimmed.parse::<f64>() else {
            continue;
        };

        let mut total = first;
        let mut count = 1.0;
        for peer in peers {
            if let Some(v) = peer.field(field).and_then(parse_number) {
                total += v;
                count += 1.0;
            }
        }

        let combined = if AVERAGED_FIELDS.contains(&field.as_str()) {
            total / count
        } else {
            total
        };
        *value = format_number(combined);
    }
    merged
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
