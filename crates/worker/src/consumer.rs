//! Queue consumer loop.
//!
//! Blocks on the Redis job queue, loads the referenced job row, and hands
//! it to the [`JobRunner`]. Messages are acknowledged only after the run
//! reaches a terminal state, so a crash mid-run leaves the message in the
//! processing list for redelivery. Redelivered jobs re-price cheaply: leg
//! prices come back from the cache and every write is an upsert.

use std::time::Duration;

use loopfare_db::repositories::JobRepo;
use loopfare_db::DbPool;
use loopfare_pipeline::JobRunner;
use loopfare_redis::{DequeuedJob, JobQueue};
use tokio_util::sync::CancellationToken;

/// Pause after a queue error before retrying, so a Redis outage does not
/// spin the loop.
const QUEUE_ERROR_BACKOFF: Duration = Duration::from_secs(1);

pub struct QueueConsumer {
    queue: JobQueue,
    pool: DbPool,
    runner: JobRunner,
    dequeue_timeout_secs: u64,
}

impl QueueConsumer {
    pub fn new(queue: JobQueue, pool: DbPool, runner: JobRunner, dequeue_timeout_secs: u64) -> Self {
        Self {
            queue,
            pool,
            runner,
            dequeue_timeout_secs,
        }
    }

    /// Consume jobs until the cancellation token is triggered.
    ///
    /// Shutdown is checked between messages; a run already in flight is
    /// allowed to finish before the loop exits.
    pub async fn run(&self, cancel: CancellationToken) {
        tracing::info!(
            dequeue_timeout_secs = self.dequeue_timeout_secs,
            "Queue consumer started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Queue consumer shutting down");
                    break;
                }
                dequeued = self.queue.dequeue(self.dequeue_timeout_secs) => {
                    match dequeued {
                        Ok(Some(job)) => self.process(job).await,
                        Ok(None) => {}
                        Err(e) => {
                            tracing::error!(error = %e, "Queue dequeue failed");
                            tokio::time::sleep(QUEUE_ERROR_BACKOFF).await;
                        }
                    }
                }
            }
        }
    }

    /// Run one dequeued message to completion and acknowledge it.
    async fn process(&self, dequeued: DequeuedJob) {
        let job_id = dequeued.message.job_id;

        match JobRepo::find_by_id(&self.pool, job_id).await {
            Ok(Some(job)) => {
                let status = self.runner.run(&job).await;
                tracing::info!(%job_id, status = %status, "Job processed");
            }
            Ok(None) => {
                // A message referencing a deleted job is acknowledged, not
                // redelivered forever.
                tracing::warn!(%job_id, "Dequeued message references unknown job");
            }
            Err(e) => {
                // Likely a database outage. Leave the message in the
                // processing list so it is not lost.
                tracing::error!(%job_id, error = %e, "Failed to load job; message left unacked");
                return;
            }
        }

        if let Err(e) = self.queue.ack(&dequeued).await {
            tracing::error!(%job_id, error = %e, "Failed to acknowledge message");
        }
    }
}
