//! Repository for the `results` table.

use loopfare_core::types::JobId;
use sqlx::PgPool;

use crate::models::result::{ItineraryResult, UpsertResult};

/// Column list for `results` queries.
const COLUMNS: &str = "\
    id, job_id, rank, city_order, dates, total_price_cents, \
    currency, legs, priced_at, created_at, updated_at";

/// Provides upsert and read operations for priced itineraries.
pub struct ResultRepo;

impl ResultRepo {
    /// Insert or update the result for `(job_id, rank)`.
    ///
    /// Re-running a job overwrites its result row rather than appending.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertResult,
    ) -> Result<ItineraryResult, sqlx::Error> {
        let query = format!(
            "INSERT INTO results \
                 (job_id, rank, city_order, dates, total_price_cents, \
                  currency, legs, priced_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (job_id, rank) \
             DO UPDATE SET \
                 city_order = EXCLUDED.city_order, \
                 dates = EXCLUDED.dates, \
                 total_price_cents = EXCLUDED.total_price_cents, \
                 currency = EXCLUDED.currency, \
                 legs = EXCLUDED.legs, \
                 priced_at = EXCLUDED.priced_at, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ItineraryResult>(&query)
            .bind(input.job_id)
            .bind(input.rank)
            .bind(&input.city_order)
            .bind(&input.dates)
            .bind(input.total_price_cents)
            .bind(&input.currency)
            .bind(&input.legs)
            .bind(input.priced_at)
            .fetch_one(pool)
            .await
    }

    /// The rank-1 result for a job, if the job has completed a run.
    pub async fn find_by_job(
        pool: &PgPool,
        job_id: JobId,
    ) -> Result<Option<ItineraryResult>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM results WHERE job_id = $1 AND rank = 1");
        sqlx::query_as::<_, ItineraryResult>(&query)
            .bind(job_id)
            .fetch_optional(pool)
            .await
    }
}
