//! Monitor: the probe timer, the sample log and its statistics.

mod recorder;

use recorder::{Command, Recorder};

use crate::history::{HistoryError, Sample, Snapshot, Statistics};
use crate::probe::Prober;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Time between probes.
pub const PROBE_INTERVAL: Duration = Duration::from_millis(5000);

/// Monitor error types.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("monitor is already running")]
    AlreadyRunning,
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error("recorder task is no longer running")]
    RecorderClosed,
}

struct Ticker {
    stop_tx: broadcast::Sender<()>,
    handle: JoinHandle<()>,
}

/// Periodically probes the target and keeps the resulting history.
///
/// The log itself lives in a recorder task; readers get immutable
/// snapshots that are replaced wholesale after every append.
pub struct Monitor {
    prober: Arc<dyn Prober>,
    interval: Duration,
    epoch: Arc<AtomicU64>,
    commands: mpsc::Sender<Command>,
    snapshot_rx: watch::Receiver<Arc<Snapshot>>,
    ticker: Mutex<Option<Ticker>>,
}

impl Monitor {
    /// Create a stopped monitor. Must be called from within a tokio runtime.
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self::build(prober, PROBE_INTERVAL)
    }

    #[cfg(test)]
    fn with_interval(prober: Arc<dyn Prober>, interval: Duration) -> Self {
        Self::build(prober, interval)
    }

    fn build(prober: Arc<dyn Prober>, interval: Duration) -> Self {
        let (tx, rx) = mpsc::channel(256);
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(Snapshot::default()));
        let epoch = Arc::new(AtomicU64::new(0));

        tokio::spawn(Recorder::new(epoch.clone(), snapshot_tx).run(rx));

        Self {
            prober,
            interval,
            epoch,
            commands: tx,
            snapshot_rx,
            ticker: Mutex::new(None),
        }
    }

    /// Start probing. The first probe runs one full interval from now.
    pub async fn start(&self) -> Result<(), MonitorError> {
        let mut ticker = self.ticker.lock().await;
        if ticker.is_some() {
            return Err(MonitorError::AlreadyRunning);
        }

        let (stop_tx, stop_rx) = broadcast::channel(1);
        let epoch = self.epoch.load(Ordering::SeqCst);

        let handle = tokio::spawn(run_probe_loop(
            self.prober.clone(),
            self.interval,
            epoch,
            self.commands.clone(),
            stop_rx,
        ));

        *ticker = Some(Ticker { stop_tx, handle });
        tracing::info!("Monitor: started, probing every {:?}", self.interval);

        Ok(())
    }

    /// Stop probing. Probes still in flight finish but their samples are
    /// discarded. Stopping a stopped monitor does nothing.
    pub async fn stop(&self) {
        let mut ticker = self.ticker.lock().await;

        if let Some(t) = ticker.take() {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            let _ = t.stop_tx.send(());
            if let Err(e) = t.handle.await {
                tracing::error!("Monitor: probe loop ended abnormally: {}", e);
            }
            let logged = self.snapshot_rx.borrow().samples.len();
            tracing::info!("Monitor: stopped with {} samples", logged);
        }
    }

    pub async fn is_running(&self) -> bool {
        self.ticker.lock().await.is_some()
    }

    /// Append a sample and return the recomputed statistics.
    ///
    /// Goes through the same writer as probe results, so it is serialized
    /// with them. Once this returns, [`log`](Self::log) and
    /// [`stats`](Self::stats) include the sample.
    pub async fn append(&self, sample: Sample) -> Result<Statistics, MonitorError> {
        let (reply, reply_rx) = oneshot::channel();

        self.commands
            .send(Command::Append { sample, reply })
            .await
            .map_err(|_| MonitorError::RecorderClosed)?;

        let result = reply_rx.await.map_err(|_| MonitorError::RecorderClosed)?;
        Ok(result?)
    }

    /// Latest published snapshot of the log and its statistics.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot_rx.borrow().clone()
    }

    pub fn log(&self) -> Vec<Sample> {
        self.snapshot_rx.borrow().samples.clone()
    }

    pub fn stats(&self) -> Statistics {
        self.snapshot_rx.borrow().stats
    }

    #[cfg(test)]
    fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot_rx.clone()
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        if let Some(t) = self.ticker.get_mut().take() {
            self.epoch.fetch_add(1, Ordering::SeqCst);
            t.handle.abort();
        }
    }
}

/// Fire a probe every `interval` until told to stop.
///
/// Ticks do not wait for earlier probes; a slow probe overlaps the next one
/// and each still yields exactly one sample.
async fn run_probe_loop(
    prober: Arc<dyn Prober>,
    interval: Duration,
    epoch: u64,
    tx: mpsc::Sender<Command>,
    mut stop_rx: broadcast::Receiver<()>,
) {
    let mut ticks = tokio::time::interval_at(Instant::now() + interval, interval);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = stop_rx.recv() => {
                break;
            }
            _ = ticks.tick() => {
                let prober = prober.clone();
                let tx = tx.clone();

                tokio::spawn(async move {
                    let sample = prober.probe().await;
                    if tx.send(Command::Completed { epoch, sample }).await.is_err() {
                        tracing::debug!("Monitor: recorder gone, dropping probe result");
                    }
                });
            }
        }
    }
}
