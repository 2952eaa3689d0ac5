//! TTL Policy Module
//!
//! Decides whether a key qualifies for processing given its TTL.

use crate::expiry::TTL_MIN_PERSISTENT_ONLY;
use crate::store::TTL_PERSISTENT;

// == Eligibility ==
/// Returns true when a key with `ttl` passes the `ttl_min` threshold.
///
/// - `ttl_min == 0`: every key passes
/// - `ttl_min > 0`: the TTL must be strictly greater than the threshold
/// - `ttl_min == -1`: only keys without an expiry pass
///
/// Anything else is rejected, including a missing key (`-2`) under any
/// nonzero threshold.
pub fn eligible(ttl: i64, ttl_min: i64) -> bool {
    if ttl_min == 0 {
        return true;
    }
    if ttl_min > 0 {
        return ttl > ttl_min;
    }
    ttl_min == TTL_MIN_PERSISTENT_ONLY && ttl == TTL_PERSISTENT
}
