//! Stats Task
//!
//! Background task that owns the run counters. The scanner feeds it through
//! small bounded channels and reads it through a request/reply rendezvous;
//! the task also logs the counters on a fixed interval.

use std::fmt;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::error::{ExpireError, Result};

/// Interval between periodic stats lines.
pub const STATS_INTERVAL: Duration = Duration::from_secs(1);

// == Stats Snapshot ==
/// Point-in-time copy of the run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// SCAN replies consumed
    pub scans: u64,
    /// Keys returned across all replies
    pub keys: u64,
    /// Keys deleted or re-expired
    pub expired: u64,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scans={} keys={} expires={}",
            self.scans, self.keys, self.expired
        )
    }
}

// == Stats Handle ==
/// Sending side of the stats task.
///
/// Dropping the handle stops the task.
#[derive(Debug)]
pub struct StatsHandle {
    scans: mpsc::Sender<u64>,
    keys: mpsc::Sender<u64>,
    expired: mpsc::Sender<u64>,
    snapshot: mpsc::Sender<oneshot::Sender<StatsSnapshot>>,
    task: JoinHandle<()>,
}

impl StatsHandle {
    /// Adds `n` to the scan counter, waiting until the task accepts it.
    pub async fn record_scans(&self, n: u64) {
        Self::push(&self.scans, n, "scans").await;
    }

    /// Adds `n` to the key counter.
    pub async fn record_keys(&self, n: u64) {
        Self::push(&self.keys, n, "keys").await;
    }

    /// Adds `n` to the expired counter.
    pub async fn record_expired(&self, n: u64) {
        Self::push(&self.expired, n, "expires").await;
    }

    async fn push(tx: &mpsc::Sender<u64>, n: u64, counter: &str) {
        if tx.send(n).await.is_err() {
            warn!("Stats task stopped, dropped {} update of {}", counter, n);
        }
    }

    /// Current counter values.
    pub async fn snapshot(&self) -> Result<StatsSnapshot> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.snapshot
            .send(reply_tx)
            .await
            .map_err(|_| ExpireError::StatsUnavailable)?;
        reply_rx.await.map_err(|_| ExpireError::StatsUnavailable)
    }

    /// Takes the final snapshot, logs it and stops the task.
    pub async fn finish(self) -> Result<StatsSnapshot> {
        let stats = self.snapshot().await?;
        info!("Stats: {}", stats);
        Ok(stats)
    }
}

impl Drop for StatsHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns the stats task, logging counters every `report_interval`.
///
/// # Example
/// ```ignore
/// let stats = spawn_stats_task(STATS_INTERVAL);
/// stats.record_scans(1).await;
/// let final_stats = stats.finish().await?;
/// ```
pub fn spawn_stats_task(report_interval: Duration) -> StatsHandle {
    // Capacity 1 is the closest tokio gets to a rendezvous; senders wait
    // while an update is still pending.
    let (scans_tx, mut scans_rx) = mpsc::channel::<u64>(1);
    let (keys_tx, mut keys_rx) = mpsc::channel::<u64>(1);
    let (expired_tx, mut expired_rx) = mpsc::channel::<u64>(1);
    let (snapshot_tx, mut snapshot_rx) = mpsc::channel::<oneshot::Sender<StatsSnapshot>>(1);

    let task = tokio::spawn(async move {
        let mut stats = StatsSnapshot::default();
        let mut ticker = interval_at(Instant::now() + report_interval, report_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                Some(n) = scans_rx.recv() => stats.scans += n,
                Some(n) = keys_rx.recv() => stats.keys += n,
                Some(n) = expired_rx.recv() => stats.expired += n,
                Some(reply) = snapshot_rx.recv() => {
                    // Fold in updates already handed off so a snapshot never
                    // trails a send that completed before the request.
                    while let Ok(n) = scans_rx.try_recv() {
                        stats.scans += n;
                    }
                    while let Ok(n) = keys_rx.try_recv() {
                        stats.keys += n;
                    }
                    while let Ok(n) = expired_rx.try_recv() {
                        stats.expired += n;
                    }
                    let _ = reply.send(stats);
                }
                _ = ticker.tick() => info!("Stats: {}", stats),
            }
        }
    });

    StatsHandle {
        scans: scans_tx,
        keys: keys_tx,
        expired: expired_tx,
        snapshot: snapshot_tx,
        task,
    }
}
