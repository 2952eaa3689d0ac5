//! Expiredis - batch key-expiry maintenance for Redis
//!
//! Walks the keyspace with SCAN, checks each key's TTL against a threshold
//! and deletes the key or rewrites its TTL, logging throughput as it goes.

pub mod config;
pub mod error;
pub mod expiry;
pub mod scan;
pub mod store;
pub mod tasks;

pub use config::{Cli, Config};
pub use error::{ExpireError, Result};
pub use scan::{run, RunReport};
pub use store::{KeyStore, RedisStore, ScanPage};
