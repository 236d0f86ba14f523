//! Redis-backed shared infrastructure.
//!
//! The price cache, the rate limiter's per-second counters, and the job
//! queue all live in one Redis instance shared by every worker process, so
//! each uses the same keying scheme everywhere.

pub mod cache;
pub mod limiter;
pub mod queue;

pub use cache::KvCache;
pub use limiter::FixedWindowLimiter;
pub use queue::{DequeuedJob, JobMessage, JobQueue, QueueError, DEFAULT_QUEUE_KEY};

/// Connect to Redis with automatic reconnection.
///
/// The returned manager is cheaply cloneable; one per process is enough.
pub async fn connect(redis_url: &str) -> Result<redis::aio::ConnectionManager, redis::RedisError> {
    let client = redis::Client::open(redis_url)?;
    client.get_connection_manager().await
}
