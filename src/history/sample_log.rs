//! Append-only, chronologically ordered sample log.

use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

use super::{Sample, Statistics, Status};

/// History error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    #[error("sample at {sample} is older than the last logged sample at {last}")]
    OutOfOrder { sample: String, last: String },
}

/// Ordered sequence of samples; insertion order is chronological order.
///
/// Entries are never reordered or modified once pushed. There is no
/// eviction, so the log grows for the lifetime of its owner.
#[derive(Debug, Clone, Default)]
pub struct SampleLog {
    samples: Vec<Sample>,
}

impl SampleLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample.
    ///
    /// Timestamps must be non-decreasing; an older sample is rejected and
    /// the log is left unchanged.
    pub fn push(&mut self, mut sample: Sample) -> Result<(), HistoryError> {
        if let Some(last) = self.samples.last() {
            if sample.timestamp < last.timestamp {
                return Err(HistoryError::OutOfOrder {
                    sample: sample.timestamp.to_rfc3339(),
                    last: last.timestamp.to_rfc3339(),
                });
            }
        }

        if sample.status == Status::Disconnected {
            sample.latency = Duration::ZERO;
        }

        self.samples.push(sample);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Timestamp of the newest entry.
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.samples.last().map(|s| s.timestamp)
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    /// Recompute statistics by scanning every entry.
    pub fn statistics(&self) -> Statistics {
        Statistics::from_samples(&self.samples)
    }
}
