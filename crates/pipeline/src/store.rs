//! Postgres-backed [`PricingStore`].

use async_trait::async_trait;
use loopfare_core::status::JobStatus;
use loopfare_core::types::JobId;
use loopfare_db::models::job::Job;
use loopfare_db::models::priced_leg::UpsertPricedLeg;
use loopfare_db::models::result::UpsertResult;
use loopfare_db::repositories::{JobRepo, PricedLegRepo, ResultRepo};
use loopfare_db::DbPool;

use crate::deps::PricingStore;
use crate::error::PipelineError;

/// Delegates to the repository layer over a shared connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PricingStore for PgStore {
    async fn find_job(&self, id: JobId) -> Result<Option<Job>, PipelineError> {
        Ok(JobRepo::find_by_id(&self.pool, id).await?)
    }

    async fn set_status(&self, id: JobId, status: JobStatus) -> Result<(), PipelineError> {
        Ok(JobRepo::update_status(&self.pool, id, status).await?)
    }

    async fn upsert_priced_leg(&self, input: &UpsertPricedLeg) -> Result<(), PipelineError> {
        PricedLegRepo::upsert(&self.pool, input).await?;
        Ok(())
    }

    async fn upsert_result(&self, input: &UpsertResult) -> Result<(), PipelineError> {
        ResultRepo::upsert(&self.pool, input).await?;
        Ok(())
    }
}
