//! Priced itinerary result for a job.

use chrono::NaiveDate;
use loopfare_core::types::{DbId, JobId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `results` table. At most one row per `(job_id, rank)`;
/// rank is always 1 in the current single-candidate design.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ItineraryResult {
    pub id: DbId,
    pub job_id: JobId,
    pub rank: i32,
    /// Full city order including origin and return.
    pub city_order: Vec<String>,
    /// Departure date per leg, in itinerary order.
    pub dates: Vec<NaiveDate>,
    /// Exact sum of leg prices, or None when any leg failed to price.
    pub total_price_cents: Option<i64>,
    pub currency: String,
    /// Per-leg priced detail (legs that did price keep their quotes even
    /// when the total is null).
    pub legs: serde_json::Value,
    pub priced_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert-or-update payload keyed by `(job_id, rank)`.
#[derive(Debug, Clone)]
pub struct UpsertResult {
    pub job_id: JobId,
    pub rank: i32,
    pub city_order: Vec<String>,
    pub dates: Vec<NaiveDate>,
    pub total_price_cents: Option<i64>,
    pub currency: String,
    pub legs: serde_json::Value,
    pub priced_at: Timestamp,
}
