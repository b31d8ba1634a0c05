//! Error handling for the soil assessment service
//!
//! Input problems map to 4xx, unknown resources to 404, and only structural
//! faults to 5xx. Upstream data-source failures never reach this type's
//! response path; the sources degrade to empty summaries instead.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{GeometryError, JobTransitionError, LocationQuery};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Input errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Provide either country/state/city/village or lat/lon")]
    MissingLocation,

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(#[from] GeometryError),

    // Not-found errors
    #[error("No location found for: {}", describe_query(.query))]
    LocationNotFound { query: LocationQuery },

    #[error("Job not found: {0}")]
    JobNotFound(String),

    // Lifecycle errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(#[from] JobTransitionError),

    // External service errors
    #[error("Geocoding service unavailable: {0}")]
    GeocoderUnavailable(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Assessment queue is full")]
    QueueFull,

    #[error("Configuration error: {0}")]
    Configuration(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. }
            | AppError::InvalidCoordinates(_)
            | AppError::MissingLocation
            | AppError::InvalidGeometry(_) => StatusCode::BAD_REQUEST,
            AppError::LocationNotFound { .. } | AppError::JobNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidStateTransition(_) => StatusCode::CONFLICT,
            AppError::GeocoderUnavailable(_) | AppError::ExternalService(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::QueueFull => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Configuration(_) | AppError::Internal(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::InvalidCoordinates(_) => "INVALID_COORDINATES",
            AppError::MissingLocation => "MISSING_LOCATION",
            AppError::InvalidGeometry(_) => "INVALID_GEOMETRY",
            AppError::LocationNotFound { .. } => "LOCATION_NOT_FOUND",
            AppError::JobNotFound(_) => "JOB_NOT_FOUND",
            AppError::InvalidStateTransition(_) => "INVALID_STATE_TRANSITION",
            AppError::GeocoderUnavailable(_) => "GEOCODER_UNAVAILABLE",
            AppError::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            AppError::QueueFull => "QUEUE_FULL",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Internal(_) | AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

fn describe_query(query: &LocationQuery) -> String {
    match (query.place_text(), query.lat, query.lon) {
        (Some(place), _, _) => place,
        (None, Some(lat), Some(lon)) => format!("{}, {}", lat, lon),
        _ => "empty query".to_string(),
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            // Internal details stay in the log
            AppError::InternalError(_) => "An internal server error occurred".to_string(),
            AppError::Validation { message, .. } => message.clone(),
            other => other.to_string(),
        };
        let field = match &self {
            AppError::Validation { field, .. } => Some(field.clone()),
            _ => None,
        };

        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Request rejected: {}", self);
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
                field,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_errors_are_404() {
        assert_eq!(
            AppError::JobNotFound("abc".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        let err = AppError::LocationNotFound {
            query: LocationQuery {
                city: Some("Atlantis".into()),
                ..Default::default()
            },
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "No location found for: Atlantis");
    }

    #[test]
    fn test_input_errors_are_400() {
        assert_eq!(AppError::MissingLocation.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InvalidGeometry(GeometryError::Malformed("x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_queue_full_is_503() {
        assert_eq!(AppError::QueueFull.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
