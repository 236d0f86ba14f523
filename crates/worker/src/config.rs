//! Worker configuration loaded from environment variables.

use loopfare_pipeline::pricer::DEFAULT_RATE_PER_SECOND;
use loopfare_redis::DEFAULT_QUEUE_KEY;

/// Runtime settings for one worker process.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Postgres connection string. Required.
    pub database_url: String,
    /// Redis connection string (default: `redis://localhost:6379`).
    pub redis_url: String,
    /// Redis list the worker consumes jobs from.
    pub queue_key: String,
    /// Shared provider call budget per second, across all workers.
    pub rate_per_second: u32,
    /// How long one blocking dequeue waits before re-checking shutdown.
    pub dequeue_timeout_secs: u64,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                  |
    /// |------------------------|--------------------------|
    /// | `DATABASE_URL`         | (required)               |
    /// | `REDIS_URL`            | `redis://localhost:6379` |
    /// | `QUEUE_KEY`            | `loopfare:jobs`          |
    /// | `RATE_PER_SECOND`      | `10`                     |
    /// | `DEQUEUE_TIMEOUT_SECS` | `5`                      |
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".into());

        let queue_key = std::env::var("QUEUE_KEY").unwrap_or_else(|_| DEFAULT_QUEUE_KEY.into());

        let rate_per_second: u32 = std::env::var("RATE_PER_SECOND")
            .unwrap_or_else(|_| DEFAULT_RATE_PER_SECOND.to_string())
            .parse()
            .expect("RATE_PER_SECOND must be a valid u32");

        let dequeue_timeout_secs: u64 = std::env::var("DEQUEUE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("DEQUEUE_TIMEOUT_SECS must be a valid u64");

        Self {
            database_url,
            redis_url,
            queue_key,
            rate_per_second,
            dequeue_timeout_secs,
        }
    }
}
