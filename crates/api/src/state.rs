use std::sync::Arc;

use loopfare_redis::JobQueue;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: loopfare_db::DbPool,
    /// Job queue producer side.
    pub queue: JobQueue,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
