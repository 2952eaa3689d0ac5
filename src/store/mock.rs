//! Scripted in-memory store for unit tests.

use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;

use crate::error::{ExpireError, Result};
use crate::store::{KeyStore, ScanPage};

/// A command observed by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Scan(u64),
    Ttl(String),
    Del(String),
    Expire(String, i64),
}

impl Call {
    pub(crate) fn is_mutation(&self) -> bool {
        matches!(self, Call::Del(_) | Call::Expire(..))
    }
}

/// Replays queued SCAN replies and records every call.
#[derive(Debug, Default)]
pub(crate) struct ScriptedStore {
    pages: VecDeque<Result<ScanPage>>,
    ttls: HashMap<String, i64>,
    failing: HashSet<(&'static str, String)>,
    pub(crate) calls: Vec<Call>,
}

impl ScriptedStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_page(mut self, cursor: u64, keys: &[&str]) -> Self {
        let keys = keys.iter().map(|k| k.to_string()).collect();
        self.pages.push_back(Ok(ScanPage::new(cursor, keys)));
        self
    }

    pub(crate) fn with_scan_error(mut self, err: ExpireError) -> Self {
        self.pages.push_back(Err(err));
        self
    }

    pub(crate) fn with_ttl(mut self, key: &str, ttl: i64) -> Self {
        self.ttls.insert(key.to_string(), ttl);
        self
    }

    pub(crate) fn failing(mut self, command: &'static str, key: &str) -> Self {
        self.failing.insert((command, key.to_string()));
        self
    }

    pub(crate) fn mutations(&self) -> Vec<Call> {
        self.calls.iter().filter(|c| c.is_mutation()).cloned().collect()
    }

    pub(crate) fn scans(&self) -> Vec<u64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Scan(cursor) => Some(*cursor),
                _ => None,
            })
            .collect()
    }

    fn check(&self, command: &'static str, key: &str) -> Result<()> {
        if self.failing.contains(&(command, key.to_string())) {
            return Err(ExpireError::command(command, "scripted failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyStore for ScriptedStore {
    async fn scan(&mut self, cursor: u64, _pattern: &str, _count: u64) -> Result<ScanPage> {
        self.calls.push(Call::Scan(cursor));
        self.pages
            .pop_front()
            .unwrap_or_else(|| Ok(ScanPage::default()))
    }

    async fn ttl(&mut self, key: &str) -> Result<i64> {
        self.calls.push(Call::Ttl(key.to_string()));
        self.check("TTL", key)?;
        Ok(self.ttls.get(key).copied().unwrap_or(-1))
    }

    async fn del(&mut self, key: &str) -> Result<()> {
        self.calls.push(Call::Del(key.to_string()));
        self.check("DEL", key)
    }

    async fn expire(&mut self, key: &str, seconds: i64) -> Result<()> {
        self.calls.push(Call::Expire(key.to_string(), seconds));
        self.check("EXPIRE", key)
    }
}
