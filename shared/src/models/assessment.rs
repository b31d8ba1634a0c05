//! Assessment results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::confidence::ConfidenceReport;
use super::nutrient::NutrientEstimates;
use super::soil::SoilBaseline;
use super::vegetation::IndexSummary;
use super::weather::{TerrainSummary, WeatherSummary};
use crate::types::Centroid;

/// Full output of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub centroid: Centroid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    pub area_hectares: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
    pub soil_baseline: SoilBaseline,
    pub index_summary: IndexSummary,
    pub weather: WeatherSummary,
    pub terrain: TerrainSummary,
    pub nutrient_estimates: NutrientEstimates,
    pub confidence_report: ConfidenceReport,
    pub recommendation: String,
    pub timestamp: DateTime<Utc>,
}
