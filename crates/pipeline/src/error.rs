use loopfare_amadeus::AmadeusError;
use loopfare_core::error::CoreError;

/// Failures inside one job's run.
///
/// All variants abort the run: they are caught at the `JobRunner` boundary
/// and converted into a terminal `error` status plus a logged diagnostic.
/// They never crash the worker process or affect other jobs. Note that a
/// provider "no offer" outcome is not an error at all; it reaches the
/// runner as a null-priced quote.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Pricing provider error: {0}")]
    Provider(#[from] AmadeusError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
