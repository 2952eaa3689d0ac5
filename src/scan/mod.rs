//! Scan Module
//!
//! Entry point for one expiry run: starts the stats task, drives the batch
//! scanner to completion and reports the final counters.

mod scanner;

pub use scanner::{BatchScanner, ScanOutcome, StopReason, SCAN_RETRY_BACKOFF};

use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::store::KeyStore;
use crate::tasks::{spawn_stats_task, StatsSnapshot, STATS_INTERVAL};

/// Result of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: ScanOutcome,
    pub stats: StatsSnapshot,
}

/// Runs one full scan over `store`.
///
/// The final stats line is logged once, on success and on failure alike.
/// Per-key failures never end the run; only an exhausted SCAN retry cap or
/// an invalid configuration do.
pub async fn run<S>(store: &mut S, config: &Config) -> Result<RunReport>
where
    S: KeyStore + ?Sized,
{
    config.validate()?;

    let action = config.action();
    info!(
        "Scanning keys matching {:?} (count={}, limit={}, action={})",
        config.pattern,
        config.count,
        config.limit,
        action.describe()
    );

    let stats = spawn_stats_task(STATS_INTERVAL);
    let outcome = BatchScanner::new(store, config, &stats).run().await;
    let stats = stats.finish().await?;

    Ok(RunReport {
        outcome: outcome?,
        stats,
    })
}
