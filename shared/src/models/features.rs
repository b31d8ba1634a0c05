//! Feature vector shared by the nutrient model and the heuristic estimator

use serde::{Deserialize, Serialize};

use super::soil::SoilBaseline;
use super::vegetation::IndexSummary;
use super::weather::{TerrainSummary, WeatherSummary};

/// Request metadata that feeds the feature vector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentMeta {
    pub area_hectares: Option<f64>,
    pub crop_type: Option<String>,
}

/// Flat feature record sent to the prediction service.
///
/// Every field is always serialized (missing values as `null`) and in
/// declaration order; the model contract depends on the complete shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureVector {
    #[serde(rename = "pH_0_30")]
    pub ph_0_30: Option<f64>,
    pub soc_0_30: Option<f64>,
    pub clay: Option<f64>,
    pub silt: Option<f64>,
    pub sand: Option<f64>,
    pub ndvi_mean_90d: Option<f64>,
    pub ndvi_std_90d: Option<f64>,
    pub ndvi_trend_30d: Option<f64>,
    pub ndre_mean_90d: Option<f64>,
    pub bsi_mean_90d: Option<f64>,
    pub valid_obs_count: u32,
    pub cloud_pct: Option<f64>,
    pub area_ha: Option<f64>,
    #[serde(rename = "cropType")]
    pub crop_type: Option<String>,
    pub elevation: Option<f64>,
    pub rainfall_30d: Option<f64>,
}

impl FeatureVector {
    /// Wire names in schema order
    pub const FIELD_NAMES: [&'static str; 16] = [
        "pH_0_30",
        "soc_0_30",
        "clay",
        "silt",
        "sand",
        "ndvi_mean_90d",
        "ndvi_std_90d",
        "ndvi_trend_30d",
        "ndre_mean_90d",
        "bsi_mean_90d",
        "valid_obs_count",
        "cloud_pct",
        "area_ha",
        "cropType",
        "elevation",
        "rainfall_30d",
    ];
}

/// Merge every upstream summary into one feature vector.
///
/// Pure; absent inputs become `None` features.
pub fn assemble(
    baseline: &SoilBaseline,
    indices: &IndexSummary,
    terrain: &TerrainSummary,
    weather: &WeatherSummary,
    meta: &AssessmentMeta,
) -> FeatureVector {
    FeatureVector {
        ph_0_30: finite(baseline.ph.value),
        soc_0_30: finite(baseline.organic_carbon.value),
        clay: finite(baseline.clay_pct),
        silt: finite(baseline.silt_pct),
        sand: finite(baseline.sand_pct),
        ndvi_mean_90d: finite(indices.ndvi_mean),
        ndvi_std_90d: finite(indices.ndvi_std),
        ndvi_trend_30d: finite(indices.ndvi_trend_30d),
        ndre_mean_90d: finite(indices.ndre_mean),
        bsi_mean_90d: finite(indices.bare_soil_index_mean),
        valid_obs_count: indices.valid_observation_count,
        cloud_pct: finite(indices.cloud_coverage_pct),
        area_ha: finite(meta.area_hectares),
        crop_type: meta
            .crop_type
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string),
        elevation: finite(terrain.elevation_m),
        rainfall_30d: finite(weather.rainfall_30d_mm),
    }
}

// NaN and infinities are not representable in JSON
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
