//! Production implementations of the injected seams.
//!
//! The Redis adapters are deliberately lossy about backend failures: the
//! cache degrades to always-miss and the limiter fails open, both with a
//! logged warning, because neither may ever fail a job (a cache outage
//! costs provider calls, not correctness).

use async_trait::async_trait;
use loopfare_amadeus::{AmadeusClient, LegSearchRequest};
use loopfare_core::types::LegQuote;
use loopfare_redis::{FixedWindowLimiter, KvCache};

use crate::deps::{LegSearch, PriceCache, RateLimiter};
use crate::error::PipelineError;
use crate::pricer::CACHE_TTL_SECS;

/// Price cache over Redis, storing JSON-encoded [`LegQuote`]s.
pub struct RedisPriceCache {
    cache: KvCache,
}

impl RedisPriceCache {
    pub fn new(cache: KvCache) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl PriceCache for RedisPriceCache {
    async fn get(&self, key: &str) -> Option<LegQuote> {
        match self.cache.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(quote) => Some(quote),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Price cache read failed; treating as miss");
                None
            }
        }
    }

    async fn put(&self, key: &str, quote: &LegQuote) {
        let raw = match serde_json::to_string(quote) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Could not encode quote for caching");
                return;
            }
        };
        if let Err(e) = self.cache.set_ex(key, &raw, CACHE_TTL_SECS).await {
            tracing::warn!(key = %key, error = %e, "Price cache write failed; continuing uncached");
        }
    }
}

/// Rate limiter over the shared Redis counters.
pub struct RedisRateLimiter {
    limiter: FixedWindowLimiter,
}

impl RedisRateLimiter {
    pub fn new(limiter: FixedWindowLimiter) -> Self {
        Self { limiter }
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn acquire(&self, pool: &str, rate_per_second: u32) {
        // Fail open on a counter-store outage: an unthrottled call is
        // recoverable, a failed job is not.
        if let Err(e) = self.limiter.take_token(pool, rate_per_second).await {
            tracing::warn!(pool, error = %e, "Rate limiter unavailable; proceeding unthrottled");
        }
    }
}

#[async_trait]
impl LegSearch for AmadeusClient {
    async fn search(&self, req: &LegSearchRequest) -> Result<LegQuote, PipelineError> {
        Ok(self.search_leg(req).await?)
    }
}
