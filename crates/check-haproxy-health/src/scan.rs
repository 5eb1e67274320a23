//! `--scan` listing of the resources a node exposes.

use haproxy_stats::{ResourceKind, StatsSnapshot};
use std::fmt::Write;

/// Render backends with their servers, then frontends.
///
/// ```text
/// Available assets on this node (lb-01):
///
/// Backend: web-pool (UP)
///  Server 0:  web01 (UP)
///  Server 1:  web02 (DOWN)
///
/// Frontend: public (OPEN)
/// ```
pub fn render(snapshot: &StatsSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Available assets on this node ({}):", snapshot.node_name());
    let _ = writeln!(out);

    for backend in snapshot.list_backends() {
        let status = snapshot
            .status(ResourceKind::Backend, backend)
            .unwrap_or_default();
        let _ = writeln!(out, "Backend: {} ({})", backend, status);
        for (index, server) in snapshot.backend_servers(backend).iter().enumerate() {
            let label = format!("Server {}:", index);
            let _ = writeln!(out, "{:^12}{}", label, server);
        }
        let _ = writeln!(out);
    }

    for frontend in snapshot.list_frontends() {
        let status = snapshot
            .status(ResourceKind::Frontend, frontend)
            .unwrap_or_default();
        let _ = writeln!(out, "Frontend: {} ({})", frontend, status);
    }

    out
}
