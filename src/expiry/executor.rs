//! Key Action Module
//!
//! Applies at most one mutation to a scanned key.

use tracing::{debug, info};

use crate::config::Config;
use crate::expiry::eligible;
use crate::store::KeyStore;

// == Key Action ==
/// Mutation applied to eligible keys.
///
/// Resolved once per run; when several flags are set the first of
/// delete, subtract, set wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// `DEL key`
    Delete,
    /// `EXPIRE key (ttl - n)`
    SubtractTtl(i64),
    /// `EXPIRE key n`
    SetTtl(i64),
    /// Count only
    None,
}

impl KeyAction {
    pub fn from_config(config: &Config) -> Self {
        if config.delete {
            KeyAction::Delete
        } else if config.ttl_subtract > 0 {
            KeyAction::SubtractTtl(config.ttl_subtract)
        } else if config.ttl_set > 0 {
            KeyAction::SetTtl(config.ttl_set)
        } else {
            KeyAction::None
        }
    }

    /// Short name for log lines.
    pub fn describe(&self) -> String {
        match self {
            KeyAction::Delete => "delete".to_string(),
            KeyAction::SubtractTtl(n) => format!("subtract {n}s from TTL"),
            KeyAction::SetTtl(n) => format!("set TTL to {n}s"),
            KeyAction::None => "none".to_string(),
        }
    }
}

// == Key Processor ==
/// Evaluates and mutates one key at a time.
#[derive(Debug, Clone)]
pub struct KeyProcessor {
    action: KeyAction,
    ttl_min: i64,
    needs_ttl: bool,
    dry_run: bool,
}

impl KeyProcessor {
    pub fn new(config: &Config) -> Self {
        Self {
            action: config.action(),
            ttl_min: config.ttl_min,
            needs_ttl: config.needs_ttl(),
            dry_run: config.dry_run,
        }
    }

    // == Process ==
    /// Processes `key` and reports whether it counts as expired.
    ///
    /// Store failures are logged and reported as not expired; they never
    /// propagate to the caller.
    pub async fn process<S>(&self, store: &mut S, key: &str) -> bool
    where
        S: KeyStore + ?Sized,
    {
        // Without a lookup the policy sees 0.
        let mut ttl = 0;

        if self.needs_ttl {
            ttl = match store.ttl(key).await {
                Ok(ttl) => ttl,
                Err(e) => {
                    info!("Failed to get TTL for key {}: {}", key, e);
                    return false;
                }
            };
            debug!("TTL of {} for key {}", ttl, key);
        }

        if !eligible(ttl, self.ttl_min) {
            debug!("TTL {} doesn't match minimum TTL {}", ttl, self.ttl_min);
            return false;
        }

        match self.action {
            KeyAction::Delete => {
                if self.dry_run {
                    debug!("Dry-run: would delete key {}", key);
                    return true;
                }
                match store.del(key).await {
                    Ok(()) => {
                        debug!("Deleted key {}", key);
                        true
                    }
                    Err(e) => {
                        info!("Failed to DELETE key {}: {}", key, e);
                        false
                    }
                }
            }
            KeyAction::SubtractTtl(seconds) => {
                if self.dry_run {
                    debug!("Dry-run: would subtract {}s from TTL of key {}", seconds, key);
                    return true;
                }
                self.expire(store, key, ttl.wrapping_sub(seconds)).await
            }
            KeyAction::SetTtl(seconds) => {
                if self.dry_run {
                    debug!("Dry-run: would set TTL of key {} to {}s", key, seconds);
                    return true;
                }
                self.expire(store, key, seconds).await
            }
            KeyAction::None => false,
        }
    }

    async fn expire<S>(&self, store: &mut S, key: &str, seconds: i64) -> bool
    where
        S: KeyStore + ?Sized,
    {
        match store.expire(key, seconds).await {
            Ok(()) => {
                debug!("new TTL of {} for key {}", seconds, key);
                true
            }
            Err(e) => {
                info!("Failed to EXPIRE key {}: {}", key, e);
                false
            }
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mock::{Call, ScriptedStore};

    fn processor(config: Config) -> KeyProcessor {
        KeyProcessor::new(&config)
    }

    #[tokio::test]
    async fn test_no_flags_skips_ttl_lookup_and_mutations() {
        let mut store = ScriptedStore::new();
        let p = processor(Config::default());

        assert!(!p.process(&mut store, "k").await);
        assert!(store.calls.is_empty());
    }

    #[tokio::test]
    async fn test_set_ttl_without_threshold_skips_lookup() {
        let mut store = ScriptedStore::new();
        let p = processor(Config {
            ttl_set: 300,
            ..Config::default()
        });

        assert!(p.process(&mut store, "k").await);
        assert_eq!(store.calls, vec![Call::Expire("k".to_string(), 300)]);
    }

    #[tokio::test]
    async fn test_delete_wins_over_other_actions() {
        let mut store = ScriptedStore::new().with_ttl("k", 500);
        let p = processor(Config {
            delete: true,
            ttl_subtract: 10,
            ttl_set: 60,
            ..Config::default()
        });

        assert!(p.process(&mut store, "k").await);
        assert_eq!(store.mutations(), vec![Call::Del("k".to_string())]);
    }

    #[tokio::test]
    async fn test_subtract_wins_over_set() {
        let mut store = ScriptedStore::new().with_ttl("k", 500);
        let p = processor(Config {
            ttl_subtract: 100,
            ttl_set: 60,
            ..Config::default()
        });

        assert!(p.process(&mut store, "k").await);
        assert_eq!(store.mutations(), vec![Call::Expire("k".to_string(), 400)]);
    }

    #[tokio::test]
    async fn test_subtract_passes_negative_ttl_through() {
        let mut store = ScriptedStore::new().with_ttl("k", 50);
        let p = processor(Config {
            ttl_subtract: 100,
            ..Config::default()
        });

        assert!(p.process(&mut store, "k").await);
        assert_eq!(
            store.calls,
            vec![
                Call::Ttl("k".to_string()),
                Call::Expire("k".to_string(), -50)
            ]
        );
    }

    #[tokio::test]
    async fn test_subtract_wraps_instead_of_overflowing() {
        let mut store = ScriptedStore::new().with_ttl("gone", -2);
        let p = processor(Config {
            ttl_subtract: i64::MAX,
            ..Config::default()
        });

        assert!(p.process(&mut store, "gone").await);
        assert_eq!(
            store.mutations(),
            vec![Call::Expire("gone".to_string(), (-2i64).wrapping_sub(i64::MAX))]
        );
    }

    #[tokio::test]
    async fn test_threshold_boundary_blocks_mutation() {
        let mut store = ScriptedStore::new().with_ttl("at", 60).with_ttl("above", 61);
        let p = processor(Config {
            ttl_min: 60,
            delete: true,
            ..Config::default()
        });

        assert!(!p.process(&mut store, "at").await);
        assert!(p.process(&mut store, "above").await);
        assert_eq!(store.mutations(), vec![Call::Del("above".to_string())]);
    }

    #[tokio::test]
    async fn test_persistent_only_threshold() {
        let mut store = ScriptedStore::new()
            .with_ttl("forever", -1)
            .with_ttl("soon", 30);
        let p = processor(Config {
            ttl_min: -1,
            ttl_set: 3600,
            ..Config::default()
        });

        assert!(p.process(&mut store, "forever").await);
        assert!(!p.process(&mut store, "soon").await);
        assert_eq!(
            store.mutations(),
            vec![Call::Expire("forever".to_string(), 3600)]
        );
    }

    #[tokio::test]
    async fn test_dry_run_reports_expired_without_mutating() {
        let mut store = ScriptedStore::new().with_ttl("k", 500);
        for config in [
            Config {
                delete: true,
                ..Config::default()
            },
            Config {
                ttl_subtract: 10,
                ..Config::default()
            },
            Config {
                ttl_set: 10,
                ..Config::default()
            },
        ] {
            let p = processor(Config {
                dry_run: true,
                ..config
            });
            assert!(p.process(&mut store, "k").await);
        }
        assert!(store.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_ttl_failure_is_not_expired() {
        let mut store = ScriptedStore::new().failing("TTL", "k");
        let p = processor(Config {
            ttl_min: 10,
            delete: true,
            ..Config::default()
        });

        assert!(!p.process(&mut store, "k").await);
        assert!(store.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_mutation_failures_are_not_expired() {
        let mut store = ScriptedStore::new()
            .failing("DEL", "k")
            .failing("EXPIRE", "k");

        let delete = processor(Config {
            delete: true,
            ..Config::default()
        });
        let set = processor(Config {
            ttl_set: 10,
            ..Config::default()
        });

        assert!(!delete.process(&mut store, "k").await);
        assert!(!set.process(&mut store, "k").await);
        assert_eq!(store.mutations().len(), 2);
    }

    #[test]
    fn test_action_resolution() {
        assert_eq!(KeyAction::from_config(&Config::default()), KeyAction::None);
        assert_eq!(
            KeyAction::from_config(&Config {
                ttl_subtract: -5,
                ttl_set: 20,
                ..Config::default()
            }),
            KeyAction::SetTtl(20)
        );
    }
}
