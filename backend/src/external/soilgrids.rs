//! SoilGrids point query client
//!
//! Reduces multi-depth property readings to one flat mean per property.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{mean_of_layers, SoilBaseline};

use crate::config::SoilGridsConfig;
use crate::error::{AppError, AppResult};
use crate::services::sources::SoilBaselineSource;

use super::{ensure_success, http_client};

const PROPERTIES: [&str; 5] = ["phh2o", "soc", "clay", "silt", "sand"];

/// Standard depth intervals (top, bottom) in centimeters
const DEPTH_INTERVALS: [(u32, u32); 6] = [(0, 5), (5, 15), (15, 30), (30, 60), (60, 100), (100, 200)];

/// Soil properties client
#[derive(Clone)]
pub struct SoilGridsClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct SoilGridsResponse {
    #[serde(default)]
    properties: Option<Properties>,
}

/// Either the layered SoilGrids payload or a flat name -> values map
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Properties {
    Layered { layers: Vec<Layer> },
    Flat(HashMap<String, serde_json::Value>),
}

#[derive(Debug, Deserialize)]
struct Layer {
    name: String,
    #[serde(default)]
    unit_measure: Option<UnitMeasure>,
    #[serde(default)]
    depths: Vec<LayerDepth>,
}

#[derive(Debug, Deserialize)]
struct UnitMeasure {
    #[serde(default)]
    d_factor: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct LayerDepth {
    #[serde(default)]
    values: LayerValues,
}

#[derive(Debug, Default, Deserialize)]
struct LayerValues {
    #[serde(default)]
    mean: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FlatProperty {
    #[serde(default)]
    values: Vec<FlatValue>,
}

#[derive(Debug, Deserialize)]
struct FlatValue {
    #[serde(default)]
    value: Option<f64>,
}

/// Depth intervals whose top lies above `depth_cm`, and the bottom of the
/// deepest one
fn depth_intervals(depth_cm: u32) -> (Vec<(u32, u32)>, u32) {
    let selected: Vec<(u32, u32)> = DEPTH_INTERVALS
        .iter()
        .copied()
        .filter(|(top, _)| *top < depth_cm)
        .collect();
    let bottom = selected.last().map(|(_, bottom)| *bottom).unwrap_or(0);
    (selected, bottom)
}

impl Properties {
    fn mean(&self, property: &str) -> Option<f64> {
        match self {
            Properties::Layered { layers } => {
                let layer = layers.iter().find(|l| l.name == property)?;
                let d_factor = layer
                    .unit_measure
                    .as_ref()
                    .and_then(|u| u.d_factor)
                    .filter(|d| *d > 0.0)
                    .unwrap_or(1.0);
                // soc arrives in dg/kg; report percent
                let percent_factor = if property == "soc" { 10.0 } else { 1.0 };
                mean_of_layers(layer.depths.iter().map(|d| d.values.mean))
                    .map(|v| v / d_factor / percent_factor)
            }
            Properties::Flat(map) => {
                let entry: FlatProperty = serde_json::from_value(map.get(property)?.clone()).ok()?;
                mean_of_layers(entry.values.iter().map(|v| v.value))
            }
        }
    }
}

/// Collapse a response into one scalar per property
pub fn reduce_response(response: &SoilGridsResponse, depth_cm: u32) -> SoilBaseline {
    let mut baseline = SoilBaseline::unavailable(depth_cm);
    if let Some(properties) = &response.properties {
        baseline.ph.value = properties.mean("phh2o");
        baseline.organic_carbon.value = properties.mean("soc");
        baseline.clay_pct = properties.mean("clay");
        baseline.silt_pct = properties.mean("silt");
        baseline.sand_pct = properties.mean("sand");
    }
    baseline
}

impl SoilGridsClient {
    pub fn new(config: &SoilGridsConfig) -> AppResult<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            base_url: config.base_url.clone(),
        })
    }

    /// Query the configured properties at a point down to `depth_cm`
    pub async fn query(&self, lat: f64, lon: f64, depth_cm: u32) -> AppResult<SoilGridsResponse> {
        let (intervals, _) = depth_intervals(depth_cm);

        let mut params: Vec<(&str, String)> = vec![("lon", lon.to_string()), ("lat", lat.to_string())];
        params.extend(PROPERTIES.iter().map(|p| ("property", p.to_string())));
        params.extend(
            intervals
                .iter()
                .map(|(top, bottom)| ("depth", format!("{}-{}cm", top, bottom))),
        );
        params.push(("value", "mean".to_string()));

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("SoilGrids request failed: {}", e)))?;

        ensure_success("SoilGrids", response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse SoilGrids response: {}", e)))
    }
}

#[async_trait]
impl SoilBaselineSource for SoilGridsClient {
    async fn fetch_baseline(&self, lat: f64, lon: f64, depth_cm: u32) -> SoilBaseline {
        let (_, bottom) = depth_intervals(depth_cm);
        match self.query(lat, lon, depth_cm).await {
            Ok(response) => reduce_response(&response, bottom),
            Err(e) => {
                tracing::warn!(lat, lon, "Soil baseline unavailable: {}", e);
                SoilBaseline::unavailable(bottom)
            }
        }
    }
}
