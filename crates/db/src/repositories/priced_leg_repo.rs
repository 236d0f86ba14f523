//! Repository for the `priced_legs` table.

use sqlx::PgPool;

use crate::models::priced_leg::{PricedLeg, UpsertPricedLeg};

/// Column list for `priced_legs` queries.
const COLUMNS: &str = "\
    id, job_id, origin, dest, depart_date, filters_hash, \
    offer_id, price_cents, currency, legs, fetched_at, \
    created_at, updated_at";

/// Provides upsert and read operations for per-leg pricing records.
pub struct PricedLegRepo;

impl PricedLegRepo {
    /// Insert or update the record for one natural key.
    ///
    /// A repeat fetch for the same `(job, origin, dest, depart_date,
    /// filters_hash)` overwrites the previous values; the table never
    /// accumulates duplicates.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertPricedLeg,
    ) -> Result<PricedLeg, sqlx::Error> {
        let query = format!(
            "INSERT INTO priced_legs \
                 (job_id, origin, dest, depart_date, filters_hash, \
                  offer_id, price_cents, currency, legs, fetched_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             ON CONFLICT (job_id, origin, dest, depart_date, filters_hash) \
             DO UPDATE SET \
                 offer_id = EXCLUDED.offer_id, \
                 price_cents = EXCLUDED.price_cents, \
                 currency = EXCLUDED.currency, \
                 legs = EXCLUDED.legs, \
                 fetched_at = EXCLUDED.fetched_at, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PricedLeg>(&query)
            .bind(input.job_id)
            .bind(&input.origin)
            .bind(&input.dest)
            .bind(input.depart_date)
            .bind(&input.filters_hash)
            .bind(&input.offer_id)
            .bind(input.price_cents)
            .bind(&input.currency)
            .bind(&input.legs)
            .bind(input.fetched_at)
            .fetch_one(pool)
            .await
    }
}
