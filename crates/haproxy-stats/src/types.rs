//! HAProxy stats data types.

use std::collections::HashMap;
use std::fmt;

/// Kind of proxy object a stats row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Frontend,
    Backend,
    Server,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Frontend => write!(f, "frontend"),
            ResourceKind::Backend => write!(f, "backend"),
            ResourceKind::Server => write!(f, "server"),
        }
    }
}

/// Row type as reported in the `type` column of `show stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowType {
    Frontend,
    Backend,
    Server,
    Listener,
}

impl RowType {
    /// Decode the numeric `type` column.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" => Some(RowType::Frontend),
            "1" => Some(RowType::Backend),
            "2" => Some(RowType::Server),
            "3" => Some(RowType::Listener),
            _ => None,
        }
    }

    /// Infer the row type from `svname` for stats without a `type` column.
    pub fn from_service_name(svname: &str) -> Self {
        match svname {
            "FRONTEND" => RowType::Frontend,
            "BACKEND" => RowType::Backend,
            _ => RowType::Server,
        }
    }
}

/// One row of `show stat` output.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRow {
    /// Proxy name (`pxname`)
    pub proxy: String,
    /// Service name (`svname`): `FRONTEND`, `BACKEND` or the server name
    pub service: String,
    /// Decoded `type` column
    pub row_type: RowType,
    /// Raw field values keyed by header name
    pub fields: HashMap<String, String>,
}

impl StatRow {
    /// Raw value of a field, `None` when the column does not exist.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Operational status (`UP`, `DOWN`, `OPEN`, `MAINT`, ...).
    pub fn status(&self) -> &str {
        self.field("status").unwrap_or("")
    }
}

/// Key/value pairs from `show info`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Info {
    pub fields: HashMap<String, String>,
}

impl Info {
    /// Raw value of an info key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Node name as configured with the `node` global setting.
    pub fn node_name(&self) -> &str {
        self.get("Node").unwrap_or("")
    }

    /// Global session rate limit, 0 when unset.
    pub fn session_rate_limit(&self) -> f64 {
        self.get("SessRateLimit")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0.0)
    }
}

/// A backend member as shown in scan mode and used by `active_servers`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerStatus {
    pub name: String,
    pub status: String,
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_type_codes() {
        assert_eq!(RowType::from_code("0"), Some(RowType::Frontend));
        assert_eq!(RowType::from_code("2"), Some(RowType::Server));
        assert_eq!(RowType::from_code("3"), Some(RowType::Listener));
        assert_eq!(RowType::from_code("7"), None);
    }

    #[test]
    fn test_row_type_from_service_name() {
        assert_eq!(RowType::from_service_name("FRONTEND"), RowType::Frontend);
        assert_eq!(RowType::from_service_name("BACKEND"), RowType::Backend);
        assert_eq!(RowType::from_service_name("web01"), RowType::Server);
    }

    #[test]
    fn test_info_defaults() {
        let info = Info::default();
        assert_eq!(info.node_name(), "");
        assert_eq!(info.session_rate_limit(), 0.0);
    }
}
