// ── Common types shared across the domain model ──

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which source answered a hybrid read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    /// The remote API answered authoritatively.
    Remote,
    /// The persisted local mirror answered (remote unavailable or not
    /// configured).
    LocalFallback,
}

impl Source {
    pub fn is_remote(self) -> bool {
        matches!(self, Self::Remote)
    }
}

/// Connectivity health as measured by the monitor.
///
/// Written only by the connectivity monitor; everyone else reads it
/// through a `watch` subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionMetrics {
    /// Round-trip time of the most recent successful probe.
    pub latency: Option<Duration>,
    /// When the last successful probe completed.
    pub last_success_at: Option<DateTime<Utc>>,
    /// Failed probes since the last success.
    pub consecutive_failures: u32,
    /// Probe succeeded and latency is under the healthy threshold.
    pub healthy: bool,
}

impl Default for ConnectionMetrics {
    fn default() -> Self {
        // Optimistic until the first probe says otherwise, so a freshly
        // started process does not refuse remote calls it never tried.
        Self {
            latency: None,
            last_success_at: None,
            consecutive_failures: 0,
            healthy: true,
        }
    }
}
