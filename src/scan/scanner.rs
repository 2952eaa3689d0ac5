//! Batch Scanner Module
//!
//! Drives the store's SCAN cursor from start to finish, handing each key to
//! the key processor and batch counts to the stats task.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{ExpireError, Result};
use crate::expiry::KeyProcessor;
use crate::store::KeyStore;
use crate::tasks::StatsHandle;

/// Pause after a failed SCAN before retrying the same cursor.
pub const SCAN_RETRY_BACKOFF: Duration = Duration::from_secs(1);

// == Scan State ==
/// Iteration state, owned by one scanner for one run.
#[derive(Debug, Default)]
struct ScanState {
    /// Next cursor to request; 0 at start and once the store is done
    cursor: u64,
    /// Keys from the last successful fetch
    batch: Vec<String>,
    /// Keys counted against the limit so far
    total: u64,
    /// Set once the limit cut a batch short
    complete: bool,
    /// Successful fetches
    batches: u64,
}

// == Scan Outcome ==
/// Why the scanner stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The store returned cursor 0
    CursorExhausted,
    /// The global limit was reached mid-batch
    LimitReached,
}

/// Summary of a finished scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome {
    /// Keys counted against the limit, including the one that hit it
    pub total: u64,
    /// Successful SCAN fetches
    pub batches: u64,
    pub stop: StopReason,
}

// == Batch Scanner ==
pub struct BatchScanner<'a, S: KeyStore + ?Sized> {
    store: &'a mut S,
    config: &'a Config,
    processor: KeyProcessor,
    stats: &'a StatsHandle,
    state: ScanState,
}

impl<'a, S: KeyStore + ?Sized> BatchScanner<'a, S> {
    pub fn new(store: &'a mut S, config: &'a Config, stats: &'a StatsHandle) -> Self {
        Self {
            store,
            config,
            processor: KeyProcessor::new(config),
            stats,
            state: ScanState::default(),
        }
    }

    // == Run ==
    /// Scans until the cursor is exhausted or the limit is reached.
    ///
    /// SCAN failures are retried at the same cursor after
    /// [`SCAN_RETRY_BACKOFF`], forever unless `max_scan_retries` is set.
    pub async fn run(mut self) -> Result<ScanOutcome> {
        let mut failures: u32 = 0;

        loop {
            let page = match self
                .store
                .scan(self.state.cursor, &self.config.pattern, self.config.count)
                .await
            {
                Ok(page) => {
                    failures = 0;
                    page
                }
                Err(e) => {
                    match &e {
                        ExpireError::Parse { .. } => warn!("Failed to parse response: {}", e),
                        _ => warn!("Failed to execute SCAN: {}", e),
                    }
                    failures += 1;
                    if let Some(max) = self.config.max_scan_retries {
                        if failures > max {
                            return Err(ExpireError::ScanRetriesExhausted {
                                attempts: failures,
                                cursor: self.state.cursor,
                            });
                        }
                    }
                    tokio::time::sleep(SCAN_RETRY_BACKOFF).await;
                    continue;
                }
            };

            let exhausted = page.is_last();
            self.state.cursor = page.cursor;
            self.state.batch = page.keys;
            self.state.batches += 1;

            self.process_batch().await;

            self.stats.record_scans(1).await;
            self.stats.record_keys(self.state.batch.len() as u64).await;

            if exhausted || self.state.complete {
                break;
            }
            debug!("Next cursor is {}", self.state.cursor);

            if self.config.delay_ms > 0 {
                tokio::time::sleep(self.config.delay()).await;
            }
        }

        Ok(ScanOutcome {
            total: self.state.total,
            batches: self.state.batches,
            stop: if self.state.complete {
                StopReason::LimitReached
            } else {
                StopReason::CursorExhausted
            },
        })
    }

    /// Runs the key processor over the current batch.
    ///
    /// The key that brings the total up to the limit is counted but not
    /// processed, and the rest of the batch is dropped.
    async fn process_batch(&mut self) {
        let Self {
            store,
            config,
            processor,
            stats,
            state,
        } = self;

        for key in &state.batch {
            state.total += 1;

            if config.is_limited() && state.total >= config.limit as u64 {
                info!("Reached limit of {} keys", config.limit);
                state.complete = true;
                break;
            }

            if processor.process(&mut **store, key).await {
                stats.record_expired(1).await;
            }
        }
    }
}
