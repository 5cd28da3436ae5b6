//! History model types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::Statistics;

/// Reachability outcome of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Connected,
    Disconnected,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Connected => write!(f, "Connected"),
            Status::Disconnected => write!(f, "Disconnected"),
        }
    }
}

/// One probe observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// When the probe completed.
    pub timestamp: DateTime<Utc>,
    pub status: Status,
    /// Round-trip time; zero when disconnected.
    pub latency: Duration,
}

impl Sample {
    pub fn connected(timestamp: DateTime<Utc>, latency: Duration) -> Self {
        Self {
            timestamp,
            status: Status::Connected,
            latency,
        }
    }

    pub fn disconnected(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            status: Status::Disconnected,
            latency: Duration::ZERO,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.status == Status::Connected
    }

    /// Latency in fractional milliseconds.
    pub fn latency_ms(&self) -> f64 {
        self.latency.as_nanos() as f64 / 1_000_000.0
    }
}

/// The full published view of the monitor: every sample plus the
/// statistics computed from exactly those samples.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub samples: Vec<Sample>,
    pub stats: Statistics,
}
