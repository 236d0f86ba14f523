use std::sync::Arc;
use std::time::Duration;

use loopfare_amadeus::{AmadeusClient, AmadeusConfig};
use loopfare_pipeline::adapters::{RedisPriceCache, RedisRateLimiter};
use loopfare_pipeline::store::PgStore;
use loopfare_pipeline::{JobRunner, LegPricer};
use loopfare_redis::{FixedWindowLimiter, JobQueue, KvCache};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod consumer;

use config::WorkerConfig;
use consumer::QueueConsumer;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loopfare_worker=debug,loopfare_pipeline=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = WorkerConfig::from_env();
    tracing::info!(
        queue_key = %config.queue_key,
        rate_per_second = config.rate_per_second,
        "Loaded worker configuration"
    );

    // --- Database ---
    let pool = loopfare_db::create_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    loopfare_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    loopfare_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    // --- Redis ---
    let redis = loopfare_redis::connect(&config.redis_url)
        .await
        .expect("Failed to connect to Redis");
    tracing::info!("Redis connection established");

    // --- Pipeline wiring ---
    let store = Arc::new(PgStore::new(pool.clone()));
    let pricer = LegPricer::new(
        Arc::new(RedisPriceCache::new(KvCache::new(redis.clone()))),
        Arc::new(RedisRateLimiter::new(FixedWindowLimiter::new(
            redis.clone(),
        ))),
        Arc::new(AmadeusClient::new(AmadeusConfig::from_env())),
        store.clone(),
    )
    .with_rate(config.rate_per_second);
    let runner = JobRunner::new(pricer, store);

    let queue = JobQueue::new(redis, &config.queue_key);
    let consumer = QueueConsumer::new(queue, pool, runner, config.dequeue_timeout_secs);

    // --- Consumer loop ---
    let cancel = tokio_util::sync::CancellationToken::new();
    let consumer_cancel = cancel.clone();
    let consumer_handle = tokio::spawn(async move {
        consumer.run(consumer_cancel).await;
    });

    shutdown_signal().await;

    cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(30), consumer_handle).await;
    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the worker
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
