//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod job_repo;
pub mod priced_leg_repo;
pub mod result_repo;

pub use job_repo::JobRepo;
pub use priced_leg_repo::PricedLegRepo;
pub use result_repo::ResultRepo;
