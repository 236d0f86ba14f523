//! Pure domain logic for the itinerary pricing pipeline.
//!
//! Zero internal dependencies: everything here is usable from the db,
//! pipeline, worker, and api crates alike.

pub mod error;
pub mod fingerprint;
pub mod itinerary;
pub mod status;
pub mod types;
