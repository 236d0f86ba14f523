use loopfare_redis::DEFAULT_QUEUE_KEY;

/// Server configuration loaded from environment variables.
///
/// All fields except the connection strings have defaults suitable for
/// local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// Redis connection string.
    pub redis_url: String,
    /// Redis list new jobs are posted to; must match the workers'.
    pub queue_key: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var        | Default                  |
    /// |----------------|--------------------------|
    /// | `HOST`         | `0.0.0.0`                |
    /// | `PORT`         | `3000`                   |
    /// | `CORS_ORIGINS` | `http://localhost:5173`  |
    /// | `REDIS_URL`    | `redis://localhost:6379` |
    /// | `QUEUE_KEY`    | `loopfare:jobs`          |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".into());

        let queue_key = std::env::var("QUEUE_KEY").unwrap_or_else(|_| DEFAULT_QUEUE_KEY.into());

        Self {
            host,
            port,
            cors_origins,
            redis_url,
            queue_key,
        }
    }
}
