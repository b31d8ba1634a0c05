//! Soil baseline models

use serde::{Deserialize, Serialize};

pub const SOILGRIDS_SOURCE: &str = "SoilGrids";

/// pH reading aggregated across depth layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhReading {
    pub value: Option<f64>,
    pub depth_cm: u32,
    pub source: String,
}

/// Organic carbon aggregated across depth layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganicCarbonReading {
    pub value: Option<f64>,
    pub unit: String,
    pub source: String,
}

/// Slow-changing soil chemistry and texture priors for a point.
///
/// Missing upstream data shows up as `None`, never as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilBaseline {
    #[serde(rename = "pH")]
    pub ph: PhReading,
    pub organic_carbon: OrganicCarbonReading,
    pub clay_pct: Option<f64>,
    pub silt_pct: Option<f64>,
    pub sand_pct: Option<f64>,
}

impl SoilBaseline {
    /// Baseline with every property missing
    pub fn unavailable(depth_cm: u32) -> Self {
        Self {
            ph: PhReading {
                value: None,
                depth_cm,
                source: SOILGRIDS_SOURCE.to_string(),
            },
            organic_carbon: OrganicCarbonReading {
                value: None,
                unit: "%".to_string(),
                source: SOILGRIDS_SOURCE.to_string(),
            },
            clay_pct: None,
            silt_pct: None,
            sand_pct: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ph.value.is_none()
            && self.organic_carbon.value.is_none()
            && self.clay_pct.is_none()
            && self.silt_pct.is_none()
            && self.sand_pct.is_none()
    }
}

/// Flat mean of the finite values, `None` when nothing usable remains
pub fn mean_of_layers<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}
