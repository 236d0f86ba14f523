//! HTTP API for submitting and inspecting pricing jobs.
//!
//! Exposes the building blocks (config, state, error handling, routes) so
//! integration tests and the binary entrypoint can both access them.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
