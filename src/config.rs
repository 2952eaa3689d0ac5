//! Configuration Module
//!
//! Command line flags (each also readable from an `EXPIREDIS_` environment
//! variable) and the immutable run configuration handed to the scanner.

use std::time::Duration;

use clap::Parser;

use crate::error::{ExpireError, Result};
use crate::expiry::KeyAction;

/// Default store URL when neither `--url` nor `EXPIREDIS_URL` is given.
pub const DEFAULT_URL: &str = "redis://127.0.0.1:6379";

/// Command line interface.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "expiredis",
    version,
    about = "Scan Redis keys and delete them or rewrite their TTL"
)]
pub struct Cli {
    /// Debug logging
    #[arg(long, env = "EXPIREDIS_VERBOSE")]
    pub verbose: bool,

    /// Dry run, no destructive commands
    #[arg(long = "dry-run", env = "EXPIREDIS_DRY_RUN")]
    pub dry_run: bool,

    /// URI of the Redis server
    #[arg(long, env = "EXPIREDIS_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Pattern of keys to process
    #[arg(long, env = "EXPIREDIS_PATTERN", default_value = "*")]
    pub pattern: String,

    /// Maximum number of keys to process, negative for no limit
    #[arg(
        long,
        env = "EXPIREDIS_LIMIT",
        default_value_t = 100,
        allow_negative_numbers = true
    )]
    pub limit: i64,

    /// Keys to fetch in each batch
    #[arg(
        long,
        env = "EXPIREDIS_COUNT",
        default_value_t = 100,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub count: u64,

    /// Delay in ms between batches
    #[arg(long, env = "EXPIREDIS_DELAY", default_value_t = 0)]
    pub delay: u64,

    /// Set TTL in seconds of matched keys
    #[arg(
        long = "set-ttl",
        env = "EXPIREDIS_SET_TTL",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    pub set_ttl: i64,

    /// Seconds to subtract from TTL of matched keys
    #[arg(
        long = "subtract-ttl",
        env = "EXPIREDIS_SUBTRACT_TTL",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    pub subtract_ttl: i64,

    /// Delete matched keys
    #[arg(long, env = "EXPIREDIS_DELETE")]
    pub delete: bool,

    /// Minimum TTL for a key to be processed. Use -1 to match keys without TTL.
    #[arg(
        long = "ttl-min",
        env = "EXPIREDIS_TTL_MIN",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    pub ttl_min: i64,

    /// Give up after this many consecutive SCAN failures (retries forever when unset)
    #[arg(long = "max-scan-retries", env = "EXPIREDIS_MAX_SCAN_RETRIES")]
    pub max_scan_retries: Option<u32>,
}

impl Cli {
    /// Builds the run configuration from the parsed flags.
    pub fn config(&self) -> Config {
        Config {
            pattern: self.pattern.clone(),
            count: self.count,
            limit: self.limit,
            delay_ms: self.delay,
            ttl_min: self.ttl_min,
            ttl_subtract: self.subtract_ttl,
            ttl_set: self.set_ttl,
            delete: self.delete,
            dry_run: self.dry_run,
            verbose: self.verbose,
            max_scan_retries: self.max_scan_retries,
        }
    }
}

/// Run configuration, fixed for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// SCAN MATCH pattern, interpreted by the store
    pub pattern: String,
    /// SCAN COUNT hint
    pub count: u64,
    /// Global key limit, negative means unbounded
    pub limit: i64,
    /// Pause between batches in milliseconds
    pub delay_ms: u64,
    /// Minimum TTL threshold (0 = none, -1 = keys without TTL only)
    pub ttl_min: i64,
    /// Seconds subtracted from the TTL of eligible keys
    pub ttl_subtract: i64,
    /// Fixed TTL written to eligible keys
    pub ttl_set: i64,
    /// Delete eligible keys
    pub delete: bool,
    /// Simulate mutations without issuing them
    pub dry_run: bool,
    /// Emit debug-level messages
    pub verbose: bool,
    /// Cap on consecutive SCAN failures, None retries forever
    pub max_scan_retries: Option<u32>,
}

impl Config {
    /// Rejects configurations the scanner cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.count == 0 {
            return Err(ExpireError::InvalidConfig(
                "count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a TTL lookup is issued before evaluating a key.
    ///
    /// When false the policy sees a TTL of 0.
    pub fn needs_ttl(&self) -> bool {
        self.ttl_min != 0 || self.ttl_subtract != 0
    }

    /// Whether the global limit applies.
    pub fn is_limited(&self) -> bool {
        self.limit >= 0
    }

    /// Pause between batches.
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// The action applied to eligible keys.
    pub fn action(&self) -> KeyAction {
        KeyAction::from_config(self)
    }

    /// Number of action flags that are switched on.
    pub fn configured_actions(&self) -> usize {
        [self.delete, self.ttl_subtract > 0, self.ttl_set > 0]
            .into_iter()
            .filter(|on| *on)
            .count()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pattern: "*".to_string(),
            count: 100,
            limit: 100,
            delay_ms: 0,
            ttl_min: 0,
            ttl_subtract: 0,
            ttl_set: 0,
            delete: false,
            dry_run: false,
            verbose: false,
            max_scan_retries: None,
        }
    }
}
