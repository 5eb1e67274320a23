//! The stats source abstraction consumed by the check engine.

use crate::error::Result;
use crate::snapshot::StatsSnapshot;
use async_trait::async_trait;

/// Provider of HAProxy counters.
///
/// Reading and resetting are separate operations so callers decide when the
/// reset happens relative to their reads.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Read the current counters of every frontend, backend and server.
    async fn snapshot(&self) -> Result<StatsSnapshot>;

    /// Reset all counters (`clear counters all`).
    async fn clear_counters(&self) -> Result<()>;
}
