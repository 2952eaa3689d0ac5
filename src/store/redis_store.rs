//! Redis Store Module
//!
//! `KeyStore` implementation backed by a Redis connection manager.

use std::fmt;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::Value;
use tracing::info;

use crate::error::{ExpireError, Result};
use crate::store::{KeyStore, ScanPage};

// == Redis Store ==
/// Key store talking to a Redis server.
pub struct RedisStore {
    conn: ConnectionManager,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("connection", &"ConnectionManager")
            .finish()
    }
}

impl RedisStore {
    // == Connect ==
    /// Opens a connection to the server at `url`.
    ///
    /// Failing here is fatal for a run; later command failures are not.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| ExpireError::Connection(format!("invalid url {url}: {e}")))?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| ExpireError::Connection(e.to_string()))?;

        info!("Connected to redis server at {}", url);
        Ok(Self { conn })
    }
}

#[async_trait]
impl KeyStore for RedisStore {
    async fn scan(&mut self, cursor: u64, pattern: &str, count: u64) -> Result<ScanPage> {
        let reply: Value = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(count)
            .query_async(&mut self.conn)
            .await
            .map_err(|e| ExpireError::command("SCAN", e))?;

        parse_scan_reply(reply)
    }

    async fn ttl(&mut self, key: &str) -> Result<i64> {
        redis::cmd("TTL")
            .arg(key)
            .query_async::<i64>(&mut self.conn)
            .await
            .map_err(|e| ExpireError::command("TTL", e))
    }

    async fn del(&mut self, key: &str) -> Result<()> {
        redis::cmd("DEL")
            .arg(key)
            .query_async::<i64>(&mut self.conn)
            .await
            .map(|_| ())
            .map_err(|e| ExpireError::command("DEL", e))
    }

    async fn expire(&mut self, key: &str, seconds: i64) -> Result<()> {
        redis::cmd("EXPIRE")
            .arg(key)
            .arg(seconds)
            .query_async::<i64>(&mut self.conn)
            .await
            .map(|_| ())
            .map_err(|e| ExpireError::command("EXPIRE", e))
    }
}

// == Reply Parsing ==
/// Decodes a `[cursor, [key, ...]]` SCAN reply.
fn parse_scan_reply(reply: Value) -> Result<ScanPage> {
    let mut parts = match reply {
        Value::Array(parts) if parts.len() == 2 => parts.into_iter(),
        other => {
            return Err(ExpireError::parse(
                "SCAN",
                format!("expected a two element array, got {other:?}"),
            ))
        }
    };

    let (Some(cursor), Some(keys)) = (parts.next(), parts.next()) else {
        return Err(ExpireError::parse("SCAN", "truncated reply"));
    };

    let cursor = text(cursor)?
        .parse::<u64>()
        .map_err(|e| ExpireError::parse("SCAN", format!("bad cursor: {e}")))?;

    let keys = match keys {
        Value::Array(items) => items.into_iter().map(text).collect::<Result<Vec<_>>>()?,
        other => {
            return Err(ExpireError::parse(
                "SCAN",
                format!("expected a key array, got {other:?}"),
            ))
        }
    };

    Ok(ScanPage::new(cursor, keys))
}

fn text(value: Value) -> Result<String> {
    match value {
        Value::BulkString(bytes) => String::from_utf8(bytes)
            .map_err(|e| ExpireError::parse("SCAN", format!("key is not utf-8: {e}"))),
        Value::SimpleString(s) => Ok(s),
        Value::Int(n) => Ok(n.to_string()),
        other => Err(ExpireError::parse(
            "SCAN",
            format!("expected a string, got {other:?}"),
        )),
    }
}
