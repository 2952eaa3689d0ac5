//! Store Module
//!
//! The narrow slice of the key-value store protocol the scanner relies on:
//! cursor-based SCAN, TTL lookup, DEL and EXPIRE.

mod redis_store;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;

use crate::error::Result;

pub use redis_store::RedisStore;

// == Public Constants ==
/// TTL reply for a key that exists without an expiry.
pub const TTL_PERSISTENT: i64 = -1;

/// TTL reply for a key that does not exist.
pub const TTL_MISSING: i64 = -2;

// == Scan Page ==
/// One reply of the cursor protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor for the next request, 0 once iteration is complete
    pub cursor: u64,
    /// Keys returned by this fetch, in reply order
    pub keys: Vec<String>,
}

impl ScanPage {
    pub fn new(cursor: u64, keys: Vec<String>) -> Self {
        Self { cursor, keys }
    }

    /// True when the store reports the iteration is complete.
    pub fn is_last(&self) -> bool {
        self.cursor == 0
    }
}

// == Key Store ==
/// Commands issued against the store.
///
/// Implementations are driven from a single task and are never shared.
#[async_trait]
pub trait KeyStore: Send {
    /// `SCAN cursor MATCH pattern COUNT count`
    async fn scan(&mut self, cursor: u64, pattern: &str, count: u64) -> Result<ScanPage>;

    /// `TTL key`
    async fn ttl(&mut self, key: &str) -> Result<i64>;

    /// `DEL key`
    async fn del(&mut self, key: &str) -> Result<()>;

    /// `EXPIRE key seconds`, negative values are passed through untouched
    async fn expire(&mut self, key: &str, seconds: i64) -> Result<()>;
}
