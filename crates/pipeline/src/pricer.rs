//! Per-leg pricing: cache first, then the rate-limited provider.

use std::sync::Arc;

use loopfare_amadeus::LegSearchRequest;
use loopfare_core::fingerprint::{filters_hash, price_key};
use loopfare_core::itinerary::Leg;
use loopfare_core::types::LegQuote;
use loopfare_db::models::job::Job;
use loopfare_db::models::priced_leg::UpsertPricedLeg;

use crate::deps::{LegSearch, PriceCache, PricingStore, RateLimiter};
use crate::error::PipelineError;

/// Rate-limiter pool shared by every outbound provider call, across all
/// worker processes.
pub const UPSTREAM_POOL: &str = "amadeus";

/// Nominal provider call rate for the shared pool.
pub const DEFAULT_RATE_PER_SECOND: u32 = 10;

/// How long cached leg prices stay valid. Entries are never invalidated
/// early; they simply age out.
pub const CACHE_TTL_SECS: u64 = 60 * 60 * 24;

/// Prices one leg at a time on behalf of a job.
pub struct LegPricer {
    cache: Arc<dyn PriceCache>,
    limiter: Arc<dyn RateLimiter>,
    search: Arc<dyn LegSearch>,
    store: Arc<dyn PricingStore>,
    rate_per_second: u32,
}

impl LegPricer {
    pub fn new(
        cache: Arc<dyn PriceCache>,
        limiter: Arc<dyn RateLimiter>,
        search: Arc<dyn LegSearch>,
        store: Arc<dyn PricingStore>,
    ) -> Self {
        Self {
            cache,
            limiter,
            search,
            store,
            rate_per_second: DEFAULT_RATE_PER_SECOND,
        }
    }

    /// Override the nominal provider rate.
    pub fn with_rate(mut self, rate_per_second: u32) -> Self {
        self.rate_per_second = rate_per_second;
        self
    }

    /// Price one leg under the job's filters.
    ///
    /// A cache hit is a pure read: no rate-limiter acquisition and no
    /// durable write. On a miss the provider outcome — including a valid
    /// "no offer" null quote — is cached for [`CACHE_TTL_SECS`] and
    /// upserted into `priced_legs`. Provider failures propagate; they are
    /// never cached and never recorded as "no offer".
    pub async fn price_leg(&self, job: &Job, leg: &Leg) -> Result<LegQuote, PipelineError> {
        let filters = job.filter_set();
        let key = price_key(&leg.origin, &leg.dest, leg.depart_date, &filters);

        if let Some(hit) = self.cache.get(&key).await {
            tracing::debug!(key = %key, "Price cache hit");
            return Ok(hit);
        }

        self.limiter.acquire(UPSTREAM_POOL, self.rate_per_second).await;

        let request = LegSearchRequest {
            origin: leg.origin.clone(),
            dest: leg.dest.clone(),
            depart_date: leg.depart_date,
            currency: job.currency.clone(),
            filters: filters.clone(),
        };
        let quote = self.search.search(&request).await?;

        self.cache.put(&key, &quote).await;

        self.store
            .upsert_priced_leg(&UpsertPricedLeg {
                job_id: job.id,
                origin: leg.origin.clone(),
                dest: leg.dest.clone(),
                depart_date: leg.depart_date,
                filters_hash: filters_hash(&filters),
                offer_id: quote.offer_id.clone(),
                price_cents: quote.min_price_cents,
                currency: quote.currency.clone(),
                legs: quote.legs.clone(),
                fetched_at: quote.fetched_at,
            })
            .await?;

        tracing::debug!(
            origin = %leg.origin,
            dest = %leg.dest,
            depart_date = %leg.depart_date,
            price_cents = ?quote.min_price_cents,
            "Priced leg via provider"
        );

        Ok(quote)
    }
}
