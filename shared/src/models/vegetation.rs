//! Vegetation index summaries

use serde::{Deserialize, Serialize};

/// Scalar statistics over a satellite observation window.
///
/// `valid_observation_count == 0` means no usable signal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSummary {
    pub ndvi_mean: Option<f64>,
    pub ndvi_std: Option<f64>,
    pub ndvi_trend_30d: Option<f64>,
    pub ndre_mean: Option<f64>,
    pub bare_soil_index_mean: Option<f64>,
    pub valid_observation_count: u32,
    pub cloud_coverage_pct: Option<f64>,
}

impl IndexSummary {
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn has_signal(&self) -> bool {
        self.valid_observation_count > 0
    }
}
