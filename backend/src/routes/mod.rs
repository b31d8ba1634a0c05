//! Route definitions for the soil assessment service

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Synchronous point/place and area assessments
        .route("/soil", get(handlers::get_soil))
        .route("/soil/area", post(handlers::assess_area))
        // Queued assessments
        .route("/soil/assess", post(handlers::submit_assessment))
        .route("/soil/assess/:job_id", get(handlers::get_assessment))
}
