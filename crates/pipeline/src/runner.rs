//! End-to-end orchestration of one pricing job.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use loopfare_core::itinerary::{build_legs, stop_sequence};
use loopfare_core::status::JobStatus;
use loopfare_core::types::LegQuote;
use loopfare_db::models::job::Job;
use loopfare_db::models::result::UpsertResult;
use serde::Serialize;

use crate::deps::PricingStore;
use crate::error::PipelineError;
use crate::pricer::LegPricer;

/// Only a single candidate itinerary is ever produced, so the result rank
/// is fixed. Re-running a job overwrites the rank-1 row.
pub const RESULT_RANK: i32 = 1;

/// One leg with its pricing outcome, stored in the result's `legs` JSON.
#[derive(Debug, Serialize)]
struct PricedLegDetail {
    origin: String,
    dest: String,
    depart_date: NaiveDate,
    result: LegQuote,
}

/// Runs one job to a terminal state.
pub struct JobRunner {
    pricer: LegPricer,
    store: Arc<dyn PricingStore>,
}

impl JobRunner {
    pub fn new(pricer: LegPricer, store: Arc<dyn PricingStore>) -> Self {
        Self { pricer, store }
    }

    /// Process a job end-to-end and return its terminal status.
    ///
    /// Never returns an error: any failure during construction or pricing
    /// is caught here, logged, and recorded as the `error` status without
    /// a result row. Legs priced before the failure keep their durable
    /// records, which is what makes redelivery safe.
    pub async fn run(&self, job: &Job) -> JobStatus {
        match self.execute(job).await {
            Ok(status) => {
                tracing::info!(job_id = %job.id, status = %status, "Job run finished");
                status
            }
            Err(e) => {
                tracing::error!(job_id = %job.id, error = %e, "Job run failed");
                if let Err(status_err) = self.store.set_status(job.id, JobStatus::Error).await {
                    tracing::error!(
                        job_id = %job.id,
                        error = %status_err,
                        "Failed to record error status; job may be stuck in running"
                    );
                }
                JobStatus::Error
            }
        }
    }

    async fn execute(&self, job: &Job) -> Result<JobStatus, PipelineError> {
        self.store.set_status(job.id, JobStatus::Running).await?;

        let legs = build_legs(
            &job.origin,
            &job.cities,
            job.end_fixed.as_deref(),
            job.window_start,
            job.window_end,
            job.nights_min,
        )?;

        // Legs are priced sequentially in itinerary order; a job's latency
        // is the sum of its legs' pricing latencies.
        let mut priced = Vec::with_capacity(legs.len());
        let mut total: Option<i64> = Some(0);

        for leg in &legs {
            let quote = self.pricer.price_leg(job, leg).await?;

            total = match (total, quote.min_price_cents) {
                (Some(sum), Some(price)) => Some(sum + price),
                _ => None,
            };
            priced.push(PricedLegDetail {
                origin: leg.origin.clone(),
                dest: leg.dest.clone(),
                depart_date: leg.depart_date,
                result: quote,
            });
        }

        let status = if total.is_some() {
            JobStatus::Done
        } else {
            JobStatus::Partial
        };

        // The result row is committed before the terminal status so a
        // status of done/partial always has a result to show.
        self.store
            .upsert_result(&UpsertResult {
                job_id: job.id,
                rank: RESULT_RANK,
                city_order: stop_sequence(&job.origin, &job.cities, job.end_fixed.as_deref()),
                dates: legs.iter().map(|l| l.depart_date).collect(),
                total_price_cents: total,
                currency: job.currency.clone(),
                legs: serde_json::to_value(&priced)?,
                priced_at: Utc::now(),
            })
            .await?;

        self.store.set_status(job.id, status).await?;
        Ok(status)
    }
}
