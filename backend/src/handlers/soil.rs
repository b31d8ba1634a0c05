//! HTTP handlers for synchronous soil assessments

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use shared::{AssessmentResult, Geometry, LocationQuery};
use validator::Validate;

use super::validate_input;
use crate::error::{AppError, AppResult};
use crate::services::AssessmentOptions;
use crate::AppState;

/// Query parameters for a point or place assessment
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SoilQuery {
    pub village: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[validate(range(min = 1, max = 200, message = "must be between 1 and 200 cm"))]
    pub requested_depth_cm: Option<u32>,
    #[validate(length(min = 1, max = 64, message = "must be 1 to 64 characters"))]
    pub crop_type: Option<String>,
}

impl SoilQuery {
    fn location(&self) -> LocationQuery {
        LocationQuery {
            village: self.village.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
            lat: self.lat,
            lon: self.lon,
        }
    }

    fn options(&self) -> AssessmentOptions {
        AssessmentOptions {
            requested_depth_cm: self.requested_depth_cm,
            crop_type: self.crop_type.clone(),
            ..Default::default()
        }
    }
}

/// Assess a point given by coordinates or a place name
pub async fn get_soil(
    State(state): State<AppState>,
    Query(query): Query<SoilQuery>,
) -> AppResult<Json<AssessmentResult>> {
    validate_input(&query)?;
    let result = state
        .assessments
        .assess_location(&query.location(), &query.options())
        .await?;
    Ok(Json(result))
}

/// Body of a synchronous area assessment
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AreaAssessmentInput {
    #[serde(alias = "area")]
    pub polygon: Value,
    #[validate(range(min = 1, max = 200, message = "must be between 1 and 200 cm"))]
    pub requested_depth_cm: Option<u32>,
    #[validate(length(min = 1, max = 64, message = "must be 1 to 64 characters"))]
    pub crop_type: Option<String>,
}

/// Assess a polygon synchronously; malformed geometry is rejected up front
pub async fn assess_area(
    State(state): State<AppState>,
    Json(input): Json<AreaAssessmentInput>,
) -> AppResult<Json<AssessmentResult>> {
    validate_input(&input)?;
    if input.polygon.is_null() {
        return Err(AppError::validation("polygon", "polygon is required"));
    }

    let geometry = Geometry::from_geojson(&input.polygon)?;
    let options = AssessmentOptions {
        requested_depth_cm: input.requested_depth_cm,
        crop_type: input.crop_type,
        ..Default::default()
    };

    let result = state.assessments.assess_area(&geometry, &options).await?;
    Ok(Json(result))
}
