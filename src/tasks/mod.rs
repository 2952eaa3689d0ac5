//! Background Tasks Module
//!
//! Contains tasks that run alongside the scanner for the length of a run.
//!
//! # Tasks
//! - Stats: accumulates scan/key/expiry counters and logs them every second

mod stats;

pub use stats::{spawn_stats_task, StatsHandle, StatsSnapshot, STATS_INTERVAL};
