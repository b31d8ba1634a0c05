//! Weather and terrain summaries used as pipeline features

use serde::{Deserialize, Serialize};

/// Recent precipitation at a point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSummary {
    pub rainfall_30d_mm: Option<f64>,
}

/// Terrain attributes at a point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerrainSummary {
    pub elevation_m: Option<f64>,
    pub slope_deg: Option<f64>,
}
