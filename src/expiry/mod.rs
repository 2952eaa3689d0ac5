//! Expiry Module
//!
//! Per-key decisions: whether a key's TTL makes it eligible, and which
//! mutation (if any) to apply to it.

mod executor;
mod policy;


pub use executor::{KeyAction, KeyProcessor};
pub use policy::eligible;

// == Public Constants ==
/// `ttl_min` value selecting only keys that have no expiry.
pub const TTL_MIN_PERSISTENT_ONLY: i64 = -1;
