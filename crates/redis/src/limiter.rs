//! Fixed-window rate limiter over shared Redis counters.

use std::time::Duration;

use chrono::Utc;
use redis::aio::ConnectionManager;

/// Counters expire after this many seconds of inactivity.
const COUNTER_TTL_SECS: i64 = 2;

/// How long to sleep before re-attempting a saturated window.
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Coarse per-second token gate shared across all worker processes.
///
/// Each attempt increments a counter keyed by `(pool, current unix second)`
/// and succeeds when the count is within the nominal rate; otherwise it
/// sleeps 100 ms and retries against the then-current second. This is a
/// fixed-window limiter, not a smooth token bucket: bursts straddling a
/// window boundary can momentarily reach twice the nominal rate. That is a
/// known characteristic of the scheme, acceptable for background pricing.
///
/// There is no bound on retries: a perpetually saturated pool blocks the
/// caller indefinitely, so this must only be used from background workers,
/// never from a latency-sensitive path.
#[derive(Clone)]
pub struct FixedWindowLimiter {
    conn: ConnectionManager,
}

impl FixedWindowLimiter {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Block until the named pool grants a slot in its current window.
    pub async fn take_token(&self, pool: &str, rate: u32) -> Result<(), redis::RedisError> {
        loop {
            let second = Utc::now().timestamp();
            let key = format!("rl:{pool}:{second}");

            let mut conn = self.conn.clone();
            let count: i64 = redis::cmd("INCR").arg(&key).query_async(&mut conn).await?;
            let _: () = redis::cmd("EXPIRE")
                .arg(&key)
                .arg(COUNTER_TTL_SECS)
                .query_async(&mut conn)
                .await?;

            if count <= i64::from(rate) {
                return Ok(());
            }

            tracing::debug!(pool, count, rate, "Rate limit window saturated; backing off");
            tokio::time::sleep(RETRY_BACKOFF).await;
        }
    }
}
