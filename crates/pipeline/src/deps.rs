//! Injected collaborator seams.
//!
//! The cache, rate limiter, upstream provider, and durable store are
//! shared mutable state across every concurrent worker. They enter the
//! pipeline as trait objects rather than globals so the runner tests run
//! against in-memory fakes and every worker wires the same keying scheme.

use async_trait::async_trait;
use loopfare_amadeus::LegSearchRequest;
use loopfare_core::status::JobStatus;
use loopfare_core::types::{JobId, LegQuote};
use loopfare_db::models::job::Job;
use loopfare_db::models::priced_leg::UpsertPricedLeg;
use loopfare_db::models::result::UpsertResult;

use crate::error::PipelineError;

/// Upstream pricing capability: the cheapest offer for one leg.
#[async_trait]
pub trait LegSearch: Send + Sync {
    async fn search(&self, req: &LegSearchRequest) -> Result<LegQuote, PipelineError>;
}

/// Advisory price cache keyed by leg fingerprint.
///
/// Correctness never depends on it: implementations degrade to always-miss
/// on any backend failure and never surface errors to the pipeline.
#[async_trait]
pub trait PriceCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<LegQuote>;
    async fn put(&self, key: &str, quote: &LegQuote);
}

/// Token gate for outbound provider calls.
///
/// Blocks until the named pool grants a slot. The fixed-window production
/// implementation can block indefinitely under sustained saturation.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn acquire(&self, pool: &str, rate_per_second: u32);
}

/// Durable store for jobs, per-leg pricing records, and results.
///
/// The single source of truth for job status. Both upserts are keyed by
/// natural keys, so redelivered queue messages re-write rows instead of
/// duplicating them.
#[async_trait]
pub trait PricingStore: Send + Sync {
    async fn find_job(&self, id: JobId) -> Result<Option<Job>, PipelineError>;
    async fn set_status(&self, id: JobId, status: JobStatus) -> Result<(), PipelineError>;
    async fn upsert_priced_leg(&self, input: &UpsertPricedLeg) -> Result<(), PipelineError>;
    async fn upsert_result(&self, input: &UpsertResult) -> Result<(), PipelineError>;
}
