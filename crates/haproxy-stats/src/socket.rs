//! Admin socket communication layer.
//!
//! HAProxy closes a non-interactive admin connection after answering one
//! command, so every command opens its own connection and reads until EOF.

use common::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;
use tracing::{debug, trace};

/// Connection settings for one HAProxy admin socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSocket {
    path: PathBuf,
    timeout: Duration,
}

impl StatsSocket {
    pub fn new(path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Send a single command and return the complete response.
    pub async fn send_command(&self, command: &str) -> Result<String> {
        let path = self.path.display();
        debug!(socket = %path, command, "Sending admin socket command");

        let mut stream = timeout(self.timeout, UnixStream::connect(&self.path))
            .await
            .map_err(|_| Error::socket(format!("Timed out connecting to {}", path)))?
            .map_err(|e| Error::socket(format!("Failed to connect to {}: {}", path, e)))?;

        let request = format!("{}\n", command);
        timeout(self.timeout, async {
            stream.write_all(request.as_bytes()).await?;
            stream.flush().await
        })
        .await
        .map_err(|_| Error::socket(format!("Timed out writing to {}", path)))?
        .map_err(|e| Error::socket(format!("Failed to write to {}: {}", path, e)))?;

        let mut response = String::new();
        timeout(self.timeout, stream.read_to_string(&mut response))
            .await
            .map_err(|_| Error::socket(format!("Timed out reading from {}", path)))?
            .map_err(|e| Error::socket(format!("Failed to read from {}: {}", path, e)))?;

        trace!(socket = %path, bytes = response.len(), "Received admin socket response");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_socket() {
        let socket = StatsSocket::new("/nonexistent/haproxy.sock", Duration::from_millis(100));
        let err = socket.send_command("show info").await.unwrap_err();
        assert!(
            err.to_string()
                .starts_with("Socket error: Failed to connect to /nonexistent/haproxy.sock")
        );
    }
}
