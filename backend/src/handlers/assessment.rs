//! HTTP handlers for queued area assessments

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{AssessmentJob, JobStatus};
use validator::Validate;

use super::validate_input;
use crate::error::{AppError, AppResult};
use crate::services::{AssessmentOptions, AssessmentRequest};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAssessmentInput {
    /// GeoJSON Point, Polygon, MultiPolygon or Feature
    pub area: Value,
    #[validate(range(min = 1, max = 200, message = "must be between 1 and 200 cm"))]
    pub requested_depth_cm: Option<u32>,
    #[validate(length(min = 1, max = 64, message = "must be 1 to 64 characters"))]
    pub crop_type: Option<String>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAssessmentResponse {
    pub job_id: String,
    pub status: JobStatus,
}

/// Queue an area assessment; poll `GET /soil/assess/:job_id` for the result
pub async fn submit_assessment(
    State(state): State<AppState>,
    Json(input): Json<SubmitAssessmentInput>,
) -> AppResult<(StatusCode, Json<SubmitAssessmentResponse>)> {
    validate_input(&input)?;
    if input.area.is_null() {
        return Err(AppError::validation("area", "area is required"));
    }
    if let (Some(from), Some(to)) = (input.from_date, input.to_date) {
        if from >= to {
            return Err(AppError::validation("fromDate", "fromDate must be before toDate"));
        }
    }

    let request = AssessmentRequest {
        area: input.area,
        options: AssessmentOptions {
            requested_depth_cm: input.requested_depth_cm,
            crop_type: input.crop_type,
            from_date: input.from_date,
            to_date: input.to_date,
        },
    };

    let job = state.jobs.submit(request).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitAssessmentResponse {
            job_id: job.id,
            status: job.status,
        }),
    ))
}

/// Current state of an assessment job
pub async fn get_assessment(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<Json<AssessmentJob>> {
    let job = state.jobs.get(&job_id).await?;
    Ok(Json(job))
}
