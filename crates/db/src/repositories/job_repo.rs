//! Repository for the `jobs` table.
//!
//! Status values come from `loopfare_core::status::JobStatus`; no raw
//! status literals appear in queries.

use loopfare_core::status::JobStatus;
use loopfare_core::types::JobId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::job::{Job, SubmitJob};

/// Column list for `jobs` queries.
const COLUMNS: &str = "\
    id, origin, cities, end_fixed, window_start, window_end, \
    nights_min, nights_max, max_connections, \
    include_airlines, exclude_airlines, currency, status, \
    created_at, updated_at";

/// Provides CRUD operations for pricing jobs.
pub struct JobRepo;

impl JobRepo {
    /// Create a new job in `queued` status with a freshly generated id.
    pub async fn create(pool: &PgPool, input: &SubmitJob) -> Result<Job, sqlx::Error> {
        let query = format!(
            "INSERT INTO jobs \
                 (id, origin, cities, end_fixed, window_start, window_end, \
                  nights_min, nights_max, max_connections, \
                  include_airlines, exclude_airlines, currency, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Job>(&query)
            .bind(Uuid::now_v7())
            .bind(&input.origin)
            .bind(&input.cities)
            .bind(&input.end_fixed)
            .bind(input.window_start)
            .bind(input.window_end)
            .bind(input.nights_min)
            .bind(input.nights_max)
            .bind(input.max_connections)
            .bind(&input.include_airlines)
            .bind(&input.exclude_airlines)
            .bind(&input.currency)
            .bind(JobStatus::Queued.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a job by its ID.
    pub async fn find_by_id(pool: &PgPool, id: JobId) -> Result<Option<Job>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM jobs WHERE id = $1");
        sqlx::query_as::<_, Job>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Set a job's status.
    ///
    /// Transition validity is the caller's concern (the runner only ever
    /// walks `queued -> running -> terminal`); the store is the single
    /// source of truth for the current value.
    pub async fn update_status(
        pool: &PgPool,
        id: JobId,
        status: JobStatus,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE jobs SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(pool)
            .await?;
        Ok(())
    }
}
