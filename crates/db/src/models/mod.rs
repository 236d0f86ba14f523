//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus the DTOs used to create or upsert it.

pub mod job;
pub mod priced_leg;
pub mod result;
