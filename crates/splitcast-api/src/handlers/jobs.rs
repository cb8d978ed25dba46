//! Job submission and status handlers.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use splitcast_models::{Job, JobId, JobState};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Request body for job submission.
///
/// Everything except `video_url` falls back to the server defaults.
#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    #[serde(default)]
    pub video_url: Option<String>,

    /// Display title, rendered into the overlay and artifact names
    #[serde(default)]
    pub movie_name: Option<String>,

    /// Segment duration override, seconds
    #[serde(default)]
    pub segment_duration: Option<u64>,

    /// Segment overlap override, seconds
    #[serde(default)]
    pub segment_overlap: Option<f64>,
}

/// Response for an accepted job.
#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub job_id: String,
    pub state: JobState,
}

/// Job status response.
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub state: JobState,
    pub created_at: String,
    pub updated_at: String,
    /// Segment index -> published URL (present once completed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<BTreeMap<usize, String>>,
    /// Indices that never produced a usable artifact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_indices: Option<Vec<usize>>,
    /// Diagnostic for a failed job
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /api/jobs
///
/// Accept a segmentation job and start processing it asynchronously.
///
/// Returns:
/// - 202: Job accepted, body carries the job ID for polling
/// - 400: Missing video_url or invalid segmentation parameters
pub async fn create_job(
    State(state): State<AppState>,
    Json(request): Json<CreateJobRequest>,
) -> ApiResult<(StatusCode, Json<CreateJobResponse>)> {
    let video_url = request
        .video_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing video_url"))?;

    let title = request
        .movie_name
        .unwrap_or_else(|| "video".to_string());

    let mut config = state.pipeline.job_defaults.clone();
    if let Some(duration) = request.segment_duration {
        config.segment_duration_secs = duration as f64;
    }
    if let Some(overlap) = request.segment_overlap {
        config.overlap_secs = overlap;
    }
    config
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let job = Job::new(video_url, title, config);
    let job_id = job.id.clone();

    info!(
        job_id = %job_id,
        source_url = %job.source_url,
        segment_duration = job.config.segment_duration_secs,
        overlap = job.config.overlap_secs,
        "Accepted segmentation job"
    );

    state.registry.insert(job).await;
    state.executor.submit(job_id.clone());

    Ok((
        StatusCode::ACCEPTED,
        Json(CreateJobResponse {
            job_id: job_id.to_string(),
            state: JobState::Queued,
        }),
    ))
}

/// GET /api/jobs/:job_id
///
/// Poll the current status of a job.
///
/// Returns:
/// - 200: Job snapshot, including the manifest once completed
/// - 404: Unknown job ID (never registered, or evicted after retention)
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<JobStatusResponse>> {
    let id = JobId::from_string(job_id);

    let job = state
        .registry
        .get(&id)
        .await
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    let (manifest, failed_indices) = match &job.result {
        Some(result) => (
            Some(result.manifest.clone()),
            Some(result.failed_indices.clone()),
        ),
        None => (None, None),
    };

    Ok(Json(JobStatusResponse {
        job_id: job.id.to_string(),
        state: job.state,
        created_at: job.created_at.to_rfc3339(),
        updated_at: job.updated_at.to_rfc3339(),
        manifest,
        failed_indices,
        error: job.error,
    }))
}
