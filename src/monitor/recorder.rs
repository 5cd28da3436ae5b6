//! Single writer of the sample log.
//!
//! Every append, whether from a finished probe or an explicit caller, goes
//! through the recorder task, which applies them one at a time and publishes
//! a fresh snapshot after each.

use crate::history::{HistoryError, Sample, SampleLog, Snapshot, Statistics};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};

/// Messages accepted by the recorder task.
pub(crate) enum Command {
    /// A probe started during run `epoch` finished.
    Completed { epoch: u64, sample: Sample },
    /// Explicit append; the outcome is sent back on `reply`.
    Append {
        sample: Sample,
        reply: oneshot::Sender<Result<Statistics, HistoryError>>,
    },
}

pub(crate) struct Recorder {
    log: SampleLog,
    epoch: Arc<AtomicU64>,
    publish: watch::Sender<Arc<Snapshot>>,
}

impl Recorder {
    pub(crate) fn new(epoch: Arc<AtomicU64>, publish: watch::Sender<Arc<Snapshot>>) -> Self {
        Self {
            log: SampleLog::new(),
            epoch,
            publish,
        }
    }

    /// Drain commands until every sender is gone.
    pub(crate) async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        while let Some(cmd) = rx.recv().await {
            self.handle(cmd);
        }
        tracing::debug!("Recorder: command channel closed, {} samples logged", self.log.len());
    }

    pub(crate) fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Completed { epoch, sample } => {
                let current = self.epoch.load(Ordering::SeqCst);
                if epoch != current {
                    tracing::debug!(
                        "Recorder: discarding sample from stopped run {} (current {})",
                        epoch,
                        current
                    );
                    return;
                }

                let sample = self.clamp_to_log(sample);
                let status = sample.status;
                match self.record(sample) {
                    Ok(stats) => tracing::debug!(
                        "Recorder: {} sample logged, uptime {:.2}%",
                        status,
                        stats.uptime_pct
                    ),
                    Err(e) => tracing::warn!("Recorder: dropping probe result: {}", e),
                }
            }
            Command::Append { sample, reply } => {
                let _ = reply.send(self.record(sample));
            }
        }
    }

    /// Probe results are stamped before they reach the recorder, so a
    /// clock step or a reordered send can leave one behind the log. Such a
    /// result is still an observation; it takes the newest logged time.
    fn clamp_to_log(&self, mut sample: Sample) -> Sample {
        if let Some(last) = self.log.last_timestamp() {
            if sample.timestamp < last {
                tracing::debug!(
                    "Recorder: probe result stamped {} is behind the log, using {}",
                    sample.timestamp,
                    last
                );
                sample.timestamp = last;
            }
        }
        sample
    }

    fn record(&mut self, sample: Sample) -> Result<Statistics, HistoryError> {
        self.log.push(sample)?;

        let stats = self.log.statistics();
        self.publish.send_replace(Arc::new(Snapshot {
            samples: self.log.as_slice().to_vec(),
            stats,
        }));

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    fn recorder() -> (Recorder, Arc<AtomicU64>, watch::Receiver<Arc<Snapshot>>) {
        let epoch = Arc::new(AtomicU64::new(0));
        let (tx, rx) = watch::channel(Arc::new(Snapshot::default()));
        (Recorder::new(epoch.clone(), tx), epoch, rx)
    }

    #[test]
    fn test_completed_sample_is_published() {
        let (mut rec, _, rx) = recorder();
        rec.handle(Command::Completed {
            epoch: 0,
            sample: Sample::connected(Utc::now(), Duration::from_millis(30)),
        });

        let snap = rx.borrow().clone();
        assert_eq!(snap.samples.len(), 1);
        assert_eq!(snap.stats.uptime_pct, 100.0);
    }

    #[test]
    fn test_stale_epoch_is_discarded() {
        let (mut rec, epoch, rx) = recorder();
        epoch.store(3, Ordering::SeqCst);
        rec.handle(Command::Completed {
            epoch: 2,
            sample: Sample::disconnected(Utc::now()),
        });

        assert!(rx.borrow().samples.is_empty());
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_late_stamped_completion_is_kept() {
        let (mut rec, _, rx) = recorder();
        let now = Utc::now();
        rec.handle(Command::Completed {
            epoch: 0,
            sample: Sample::connected(now, Duration::from_millis(20)),
        });
        rec.handle(Command::Completed {
            epoch: 0,
            sample: Sample::disconnected(now - chrono::Duration::seconds(2)),
        });

        let snap = rx.borrow().clone();
        assert_eq!(snap.samples.len(), 2);
        assert_eq!(snap.samples[1].status, crate::history::Status::Disconnected);
        assert_eq!(snap.samples[1].timestamp, now);
        assert_eq!(snap.stats.downtime_pct, 50.0);
    }

    #[test]
    fn test_append_replies_with_stats() {
        let (mut rec, _, rx) = recorder();
        let (reply, mut reply_rx) = oneshot::channel();
        rec.handle(Command::Append {
            sample: Sample::disconnected(Utc::now()),
            reply,
        });

        let stats = reply_rx.try_recv().unwrap().unwrap();
        assert_eq!(stats.downtime_pct, 100.0);
        assert_eq!(rx.borrow().stats, stats);
    }

    #[test]
    fn test_rejected_append_leaves_snapshot_alone() {
        let (mut rec, _, rx) = recorder();
        let now = Utc::now();
        rec.record(Sample::disconnected(now)).unwrap();

        let (reply, mut reply_rx) = oneshot::channel();
        rec.handle(Command::Append {
            sample: Sample::disconnected(now - chrono::Duration::seconds(1)),
            reply,
        });

        assert!(reply_rx.try_recv().unwrap().is_err());
        assert_eq!(rx.borrow().samples.len(), 1);
    }
}
