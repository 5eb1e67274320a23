//! Parsers for the text responses of the HAProxy admin socket.

use crate::types::{Info, RowType, StatRow};
use common::{Error, Result};
use std::collections::HashMap;
use tracing::{trace, warn};

/// Parse the CSV output of `show stat`.
///
/// The header line starts with `# `. Listener rows are kept here and filtered
/// by the snapshot.
pub fn parse_stat(output: &str) -> Result<Vec<StatRow>> {
    let mut lines = output.lines().filter(|line| !line.trim().is_empty());

    let header_line = lines
        .next()
        .ok_or_else(|| Error::protocol("empty response to \"show stat\""))?;
    let header = header_line.strip_prefix("# ").ok_or_else(|| {
        Error::protocol(format!(
            "unexpected response to \"show stat\": {}",
            header_line.trim()
        ))
    })?;
    let columns = split_row(header);

    if !columns.iter().any(|c| c == "pxname") || !columns.iter().any(|c| c == "svname") {
        return Err(Error::protocol("stats header lacks pxname/svname columns"));
    }

    let mut rows = Vec::new();
    for line in lines {
        let values = split_row(line);
        if values.len() < columns.len() {
            warn!(
                expected = columns.len(),
                got = values.len(),
                "Short stats row, missing fields read as empty"
            );
        }

        let fields: HashMap<String, String> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let value = values.get(i).cloned().unwrap_or_default();
                (column.clone(), value)
            })
            .collect();

        let proxy = fields.get("pxname").cloned().unwrap_or_default();
        let service = fields.get("svname").cloned().unwrap_or_default();
        let row_type = fields
            .get("type")
            .and_then(|code| RowType::from_code(code))
            .unwrap_or_else(|| RowType::from_service_name(&service));

        trace!(proxy = %proxy, service = %service, ?row_type, "Parsed stats row");
        rows.push(StatRow {
            proxy,
            service,
            row_type,
            fields,
        });
    }

    Ok(rows)
}

/// Parse the `Key: value` output of `show info`.
pub fn parse_info(output: &str) -> Info {
    let fields = output
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();
    Info { fields }
}

/// Split a CSV line. Quoted cells may hold commas and doubled quotes
/// (`last_chk`, `check_desc`). The empty cell after the trailing comma is
/// dropped.
fn split_row(line: &str) -> Vec<String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                cell.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => cells.push(std::mem::take(&mut cell)),
            _ => cell.push(c),
        }
    }

    if quoted {
        warn!("Unterminated quoted field in stats row");
    }
    if !(cell.is_empty() && !quoted && line.ends_with(',')) {
        cells.push(cell);
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT: &str = "\
# pxname,svname,qcur,qmax,scur,slim,status,type,
public,FRONTEND,,,3,100,OPEN,0,
web-pool,web01,0,0,1,50,UP,2,
web-pool,BACKEND,0,0,1,10,UP,1,
stats,sock-1,,,0,,OPEN,3,
";

    #[test]
    fn test_parse_stat_rows() {
        let rows = parse_stat(STAT).unwrap();
        assert_eq!(rows.len(), 4);

        assert_eq!(rows[0].proxy, "public");
        assert_eq!(rows[0].row_type, RowType::Frontend);
        assert_eq!(rows[0].field("scur"), Some("3"));
        assert_eq!(rows[0].field("qcur"), Some(""));

        assert_eq!(rows[1].service, "web01");
        assert_eq!(rows[1].status(), "UP");
        assert_eq!(rows[3].row_type, RowType::Listener);
    }

    #[test]
    fn test_parse_stat_without_type_column() {
        let rows = parse_stat("# pxname,svname,scur\nweb,BACKEND,4\nweb,s1,2\n").unwrap();
        assert_eq!(rows[0].row_type, RowType::Backend);
        assert_eq!(rows[1].row_type, RowType::Server);
    }

    #[test]
    fn test_parse_stat_short_row() {
        let rows = parse_stat("# pxname,svname,scur,slim,\nweb,BACKEND,4\n").unwrap();
        assert_eq!(rows[0].field("slim"), Some(""));
        assert_eq!(rows[0].field("nope"), None);
    }

    #[test]
    fn test_parse_stat_quoted_check_description() {
        let stat = "\
# pxname,svname,status,type,last_chk,qtime,
web-pool,web01,UP,2,\"HTTP status check returned code 503, retrying\",7,
web-pool,web02,UP,2,\"said \"\"hi\"\"\",3,
";
        let rows = parse_stat(stat).unwrap();
        assert_eq!(
            rows[0].field("last_chk"),
            Some("HTTP status check returned code 503, retrying")
        );
        assert_eq!(rows[0].field("qtime"), Some("7"));
        assert_eq!(rows[1].field("last_chk"), Some("said \"hi\""));

        let snapshot = crate::StatsSnapshot::from_parts(Info::default(), rows);
        assert_eq!(
            snapshot
                .counter(crate::ResourceKind::Server, "web01", "qtime")
                .unwrap(),
            7.0
        );
    }

    #[test]
    fn test_split_row_trailing_comma() {
        assert_eq!(split_row("a,,b,"), vec!["a", "", "b"]);
        assert_eq!(split_row("a,\"x,y\","), vec!["a", "x,y"]);
        assert_eq!(split_row("a,b"), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_stat_rejects_error_reply() {
        let err = parse_stat("Unknown command. Please enter one of the following commands only :\n")
            .unwrap_err();
        assert!(err.to_string().contains("Unknown command"));

        assert!(parse_stat("").is_err());
        assert!(parse_stat("# a,b,c\n").is_err());
    }

    #[test]
    fn test_parse_info() {
        let info = parse_info("Name: HAProxy\nVersion: 2.8.3\nNode: lb-01\nSessRateLimit: 200\n");
        assert_eq!(info.node_name(), "lb-01");
        assert_eq!(info.session_rate_limit(), 200.0);
        assert_eq!(info.get("Version"), Some("2.8.3"));
    }
}
