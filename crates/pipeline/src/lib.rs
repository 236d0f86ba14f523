//! The itinerary pricing pipeline.
//!
//! One job flows through here end-to-end: the [`runner::JobRunner`] builds
//! the leg sequence, prices each leg through the [`pricer::LegPricer`]
//! (cache first, then the rate-limited upstream provider), aggregates the
//! total, persists the result, and drives the job status state machine.
//!
//! Shared mutable collaborators (price cache, rate limiter, provider,
//! durable store) are injected through the traits in [`deps`], so tests
//! substitute in-memory fakes and production wires the Redis, Amadeus, and
//! Postgres implementations from [`adapters`] and [`store`].

pub mod adapters;
pub mod deps;
pub mod error;
pub mod pricer;
pub mod runner;
pub mod store;

pub use error::PipelineError;
pub use pricer::LegPricer;
pub use runner::JobRunner;
