//! Reliable job queue over Redis lists.
//!
//! Producers `LPUSH` job references; consumers `BLMOVE` them into a
//! processing list and `LREM` after the run reaches a terminal state.
//! Delivery is at-least-once: a consumer crash leaves the payload in the
//! processing list instead of losing it.

use loopfare_core::types::JobId;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};

/// Default Redis list the workers consume from.
pub const DEFAULT_QUEUE_KEY: &str = "loopfare:jobs";

/// Errors from the queue layer.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("Redis command error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Queue payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// The message shape both sides of the queue agree on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMessage {
    #[serde(rename = "jobId")]
    pub job_id: JobId,
}

/// A message pulled into the processing list, held until acknowledged.
#[derive(Debug, Clone)]
pub struct DequeuedJob {
    pub message: JobMessage,
    /// Exact payload as stored, needed to `LREM` it on ack.
    raw: String,
}

#[derive(Clone)]
pub struct JobQueue {
    conn: ConnectionManager,
    queue_key: String,
    processing_key: String,
}

impl JobQueue {
    pub fn new(conn: ConnectionManager, queue_key: impl Into<String>) -> Self {
        let queue_key = queue_key.into();
        let processing_key = format!("{queue_key}:processing");
        Self {
            conn,
            queue_key,
            processing_key,
        }
    }

    /// Post a job reference for the workers.
    pub async fn enqueue(&self, job_id: JobId) -> Result<(), QueueError> {
        let payload = serde_json::to_string(&JobMessage { job_id })?;
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("LPUSH")
            .arg(&self.queue_key)
            .arg(&payload)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    /// Wait up to `timeout_secs` for a message, moving it into the
    /// processing list. Returns `None` on timeout.
    ///
    /// Payloads that fail to parse are dropped from the processing list
    /// with a warning; they would otherwise wedge the consumer forever.
    pub async fn dequeue(&self, timeout_secs: u64) -> Result<Option<DequeuedJob>, QueueError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = redis::cmd("BLMOVE")
            .arg(&self.queue_key)
            .arg(&self.processing_key)
            .arg("RIGHT")
            .arg("LEFT")
            .arg(timeout_secs)
            .query_async(&mut conn)
            .await?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str::<JobMessage>(&raw) {
            Ok(message) => Ok(Some(DequeuedJob { message, raw })),
            Err(e) => {
                tracing::warn!(error = %e, payload = %raw, "Dropping unparseable queue message");
                self.remove_processing(&raw).await?;
                Ok(None)
            }
        }
    }

    /// Acknowledge a message after its job reached a terminal state.
    pub async fn ack(&self, job: &DequeuedJob) -> Result<(), QueueError> {
        self.remove_processing(&job.raw).await
    }

    async fn remove_processing(&self, raw: &str) -> Result<(), QueueError> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("LREM")
            .arg(&self.processing_key)
            .arg(1)
            .arg(raw)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn message_uses_the_shared_wire_shape() {
        let id: JobId = Uuid::now_v7();
        let json = serde_json::to_string(&JobMessage { job_id: id }).unwrap();
        assert_eq!(json, format!("{{\"jobId\":\"{id}\"}}"));

        let parsed: JobMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.job_id, id);
    }
}
