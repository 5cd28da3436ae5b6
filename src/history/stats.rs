//! Aggregate statistics over the sample log.

use serde::Serialize;

use super::Sample;

/// Uptime, downtime and average latency over a set of samples.
///
/// Always recomputed from the whole log; never updated incrementally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub uptime_pct: f64,
    pub downtime_pct: f64,
    pub avg_latency_ms: f64,
}

impl Statistics {
    /// Full rescan of `samples`. Empty input yields all zeros.
    pub fn from_samples(samples: &[Sample]) -> Self {
        let mut up = 0u64;
        let mut down = 0u64;
        let mut total_latency_ms = 0.0;

        for sample in samples {
            if sample.is_connected() {
                up += 1;
                total_latency_ms += sample.latency_ms();
            } else {
                down += 1;
            }
        }

        let total = up + down;
        Self {
            uptime_pct: percentage(up, total),
            downtime_pct: percentage(down, total),
            avg_latency_ms: if up > 0 {
                total_latency_ms / up as f64
            } else {
                0.0
            },
        }
    }

    pub fn uptime_label(&self) -> String {
        format!("{:.2}%", self.uptime_pct)
    }

    pub fn downtime_label(&self) -> String {
        format!("{:.2}%", self.downtime_pct)
    }

    pub fn avg_latency_label(&self) -> String {
        format!("{:.2} ms", self.avg_latency_ms)
    }
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
