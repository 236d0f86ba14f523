//! Routes for the `/jobs` resource: submission and status polling.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use loopfare_core::error::CoreError;
use loopfare_core::types::JobId;
use loopfare_db::models::job::{Job, SubmitJob};
use loopfare_db::models::result::ItineraryResult;
use loopfare_db::repositories::{JobRepo, ResultRepo};
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Response to a successful job submission.
#[derive(Serialize)]
pub struct SubmitResponse {
    pub id: JobId,
    /// Where to poll for the job's status and result.
    pub status_url: String,
}

/// A job row together with its rank-1 result, if a run has completed.
#[derive(Serialize)]
pub struct JobDetail {
    pub job: Job,
    pub result: Option<ItineraryResult>,
}

/// POST /jobs
///
/// Validate the submission, persist it as `queued`, post its id on the
/// queue, and reply 202: pricing happens asynchronously in the workers.
async fn submit_job(
    State(state): State<AppState>,
    Json(input): Json<SubmitJob>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    // Every location must be an IATA-style 3-letter code; the derive only
    // covers the origin field.
    if let Some(code) = input
        .cities
        .iter()
        .chain(input.end_fixed.iter())
        .find(|c| c.len() != 3)
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Invalid location code: {code}"
        ))));
    }

    let job = JobRepo::create(&state.pool, &input).await?;
    state.queue.enqueue(job.id).await?;

    tracing::info!(
        job_id = %job.id,
        origin = %job.origin,
        cities = job.cities.len(),
        "Job submitted"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            id: job.id,
            status_url: format!("/jobs/{}", job.id),
        }),
    ))
}

/// GET /jobs/{id}
///
/// The job row plus its result. `result` is null until a run reaches
/// `done` or `partial`.
async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> AppResult<Json<JobDetail>> {
    let job = JobRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Job", id }))?;

    let result = ResultRepo::find_by_job(&state.pool, id).await?;

    Ok(Json(JobDetail { job, result }))
}

/// Routes mounted at `/jobs`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jobs", post(submit_job))
        .route("/jobs/{id}", get(get_job))
}
