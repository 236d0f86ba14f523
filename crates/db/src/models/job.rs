//! Pricing job entity and submission DTO.

use chrono::NaiveDate;
use loopfare_core::fingerprint::FilterSet;
use loopfare_core::types::{JobId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Job {
    pub id: JobId,
    pub origin: String,
    pub cities: Vec<String>,
    pub end_fixed: Option<String>,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub nights_min: i32,
    pub nights_max: i32,
    pub max_connections: i16,
    pub include_airlines: Vec<String>,
    pub exclude_airlines: Vec<String>,
    pub currency: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Job {
    /// Airline/connection filters this job applies to every leg search.
    pub fn filter_set(&self) -> FilterSet {
        FilterSet {
            include_airlines: self.include_airlines.clone(),
            exclude_airlines: self.exclude_airlines.clone(),
            max_connections: self.max_connections,
        }
    }
}

/// DTO for submitting a new job via `POST /jobs`.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitJob {
    /// Origin location code (IATA, 3 letters).
    #[validate(length(equal = 3))]
    pub origin: String,
    /// Intermediate cities in visiting order.
    #[validate(length(min = 2, max = 6))]
    pub cities: Vec<String>,
    /// Fixed end location; defaults to the origin when absent.
    pub end_fixed: Option<String>,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    /// Minimum nights per city. Only this bound drives the pricing loop.
    #[validate(range(min = 1))]
    pub nights_min: i32,
    pub nights_max: i32,
    /// 0 = direct only, 1 = at most one connection.
    #[validate(range(min = 0, max = 1))]
    #[serde(default = "default_max_connections")]
    pub max_connections: i16,
    #[serde(default)]
    pub include_airlines: Vec<String>,
    #[serde(default)]
    pub exclude_airlines: Vec<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_max_connections() -> i16 {
    1
}

fn default_currency() -> String {
    "EUR".to_string()
}
