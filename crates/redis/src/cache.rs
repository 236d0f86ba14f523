//! String key-value cache with fixed expiry.

use redis::aio::ConnectionManager;

/// Thin wrapper over `GET`/`SETEX` for string payloads.
///
/// Callers decide what the strings mean (the pipeline stores JSON-encoded
/// leg quotes keyed by price fingerprint) and how to react to errors; this
/// layer just reports them.
#[derive(Clone)]
pub struct KvCache {
    conn: ConnectionManager,
}

impl KvCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Fetch a value, `None` when the key is missing or expired.
    pub async fn get(&self, key: &str) -> Result<Option<String>, redis::RedisError> {
        let mut conn = self.conn.clone();
        redis::cmd("GET").arg(key).query_async(&mut conn).await
    }

    /// Store a value that expires after `ttl_secs`.
    pub async fn set_ex(
        &self,
        key: &str,
        value: &str,
        ttl_secs: u64,
    ) -> Result<(), redis::RedisError> {
        let mut conn = self.conn.clone();
        redis::cmd("SETEX")
            .arg(key)
            .arg(ttl_secs)
            .arg(value)
            .query_async(&mut conn)
            .await
    }
}
