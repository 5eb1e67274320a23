//! Client for the HAProxy admin (stats) socket.
//!
//! Reads `show info` and `show stat` into a [`StatsSnapshot`] and resets
//! counters with `clear counters all`. Deployments running several processes
//! expose one socket per process; pointing [`HAProxy::from_socket_dir`] at the
//! directory holding them merges their counters into one view.
//!
//! # Example
//!
//! ```no_run
//! use haproxy_stats::{HAProxy, ResourceKind, StatsSource};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let haproxy = HAProxy::new("/var/run/haproxy.sock", Duration::from_secs(5));
//! let snapshot = haproxy.snapshot().await?;
//!
//! for backend in snapshot.list_backends() {
//!     let sessions = snapshot.counter(ResourceKind::Backend, backend, "scur")?;
//!     println!("{}: {} sessions", backend, sessions);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod parser;
mod snapshot;
mod socket;
mod source;
mod types;

pub use error::{Result, StatsError};
pub use parser::{parse_info, parse_stat};
pub use snapshot::StatsSnapshot;
pub use socket::StatsSocket;
pub use source::StatsSource;
pub use types::{Info, ResourceKind, RowType, ServerStatus, StatRow};

use async_trait::async_trait;
use common::Error;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Default admin socket location.
pub const DEFAULT_SOCKET_FILE: &str = "/var/run/haproxy.sock";

/// HAProxy instance reachable through one or more admin sockets.
#[derive(Debug, Clone)]
pub struct HAProxy {
    sockets: Vec<StatsSocket>,
}

impl HAProxy {
    /// Instance with a single admin socket.
    pub fn new(socket_file: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            sockets: vec![StatsSocket::new(socket_file, timeout)],
        }
    }

    /// Instance with one admin socket per process, found in `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or holds no sockets.
    pub fn from_socket_dir(dir: impl AsRef<Path>, timeout: Duration) -> Result<Self> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(Error::from)?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(Error::from)?;
            if entry.file_type().map_err(Error::from)?.is_socket() {
                paths.push(entry.path());
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(StatsError::NoSockets(dir.to_path_buf()));
        }

        debug!(dir = %dir.display(), sockets = paths.len(), "Discovered admin sockets");
        Ok(Self {
            sockets: paths
                .into_iter()
                .map(|path| StatsSocket::new(path, timeout))
                .collect(),
        })
    }

    pub fn sockets(&self) -> &[StatsSocket] {
        &self.sockets
    }

    async fn process_snapshot(socket: &StatsSocket) -> Result<StatsSnapshot> {
        let info = parse_info(&socket.send_command("show info").await?);
        let rows = parse_stat(&socket.send_command("show stat").await?)?;
        Ok(StatsSnapshot::from_parts(info, rows))
    }
}

#[async_trait]
impl StatsSource for HAProxy {
    async fn snapshot(&self) -> Result<StatsSnapshot> {
        let mut snapshots = Vec::with_capacity(self.sockets.len());
        for socket in &self.sockets {
            snapshots.push(Self::process_snapshot(socket).await?);
        }
        Ok(StatsSnapshot::merge(snapshots))
    }

    async fn clear_counters(&self) -> Result<()> {
        for socket in &self.sockets {
            let response = socket.send_command("clear counters all").await?;
            let response = response.trim();
            if !response.is_empty() {
                return Err(Error::protocol(format!(
                    "\"clear counters all\" refused by {}: {}",
                    socket.path().display(),
                    response
                ))
                .into());
            }
        }
        info!(sockets = self.sockets.len(), "Cleared HAProxy counters");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_dir_missing() {
        let err = HAProxy::from_socket_dir("/nonexistent/haproxy", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, StatsError::Transport(Error::Io(_))));
    }

    #[test]
    fn test_socket_dir_without_sockets() {
        let dir = std::env::temp_dir().join(format!("haproxy-stats-empty-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("not-a-socket"), b"").unwrap();

        let err = HAProxy::from_socket_dir(&dir, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, StatsError::NoSockets(_)));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
