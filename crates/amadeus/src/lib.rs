//! REST client for the Amadeus flight-offers API.
//!
//! [`AmadeusClient`] authenticates with OAuth2 client credentials, caches
//! the bearer token until near expiry, and searches the cheapest offer for
//! a single leg. The pipeline treats it as a black-box pricing capability
//! behind the `LegSearch` seam.

pub mod client;
pub mod offers;

pub use client::{AmadeusClient, AmadeusConfig, AmadeusError, LegSearchRequest};
