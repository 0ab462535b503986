//! Staleness decisions for cached data.

use std::time::Duration;

/// Sentinel timestamp for data that has never been fetched.
pub const NEVER_FETCHED: i64 = 0;

/// Maximum age before a cached record is eligible for refresh.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Returns true when data fetched at `fetched_at_ms` has outlived `ttl` as of
/// `now_ms`. Timestamps are Unix epoch milliseconds.
///
/// Never-fetched data (`fetched_at_ms <= NEVER_FETCHED`) is always stale,
/// including under clocks where `now_ms` itself is within one TTL of zero.
pub fn is_stale(now_ms: i64, fetched_at_ms: i64, ttl: Duration) -> bool {
    if fetched_at_ms <= NEVER_FETCHED {
        return true;
    }
    now_ms - fetched_at_ms > ttl.as_millis() as i64
}
