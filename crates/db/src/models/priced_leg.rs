//! Durable record of one leg pricing attempt.

use chrono::NaiveDate;
use loopfare_core::types::{DbId, JobId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `priced_legs` table.
///
/// At most one row exists per
/// `(job_id, origin, dest, depart_date, filters_hash)`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PricedLeg {
    pub id: DbId,
    pub job_id: JobId,
    pub origin: String,
    pub dest: String,
    pub depart_date: NaiveDate,
    pub filters_hash: String,
    /// None when the provider found no offer for the leg.
    pub offer_id: Option<String>,
    /// Cheapest price in minor units; None when no offer was found.
    pub price_cents: Option<i64>,
    pub currency: String,
    /// Raw upstream itinerary legs of the cheapest offer.
    pub legs: serde_json::Value,
    pub fetched_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert-or-update payload keyed by the table's natural key.
#[derive(Debug, Clone)]
pub struct UpsertPricedLeg {
    pub job_id: JobId,
    pub origin: String,
    pub dest: String,
    pub depart_date: NaiveDate,
    pub filters_hash: String,
    pub offer_id: Option<String>,
    pub price_cents: Option<i64>,
    pub currency: String,
    pub legs: serde_json::Value,
    pub fetched_at: Timestamp,
}
