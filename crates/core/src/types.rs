use serde::{Deserialize, Serialize};

/// Job identifiers are UUIDv7: opaque to callers, time-sortable in the store.
pub type JobId = uuid::Uuid;

/// Internal row ids are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// The outcome of pricing one leg with the upstream provider.
///
/// A quote with `offer_id == None` and `min_price_cents == None` means the
/// provider answered successfully but found no offers for the leg. That is a
/// valid, cacheable result, distinct from a provider call failure (which is
/// an error and never becomes a `LegQuote`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegQuote {
    /// Provider id of the cheapest offer, if any offer exists.
    pub offer_id: Option<String>,
    /// Cheapest total price in integer minor currency units.
    pub min_price_cents: Option<i64>,
    /// Currency the price is denominated in.
    pub currency: String,
    /// Raw itinerary legs of the cheapest offer, as returned upstream.
    pub legs: serde_json::Value,
    /// When the provider was queried.
    pub fetched_at: Timestamp,
}

impl LegQuote {
    /// A successful provider response that contained no offers.
    pub fn no_offer(currency: &str, fetched_at: Timestamp) -> Self {
        Self {
            offer_id: None,
            min_price_cents: None,
            currency: currency.to_string(),
            legs: serde_json::Value::Array(Vec::new()),
            fetched_at,
        }
    }
}
