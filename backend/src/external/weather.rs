//! Open-Meteo client for recent rainfall and grid elevation

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use shared::{TerrainSummary, WeatherSummary};

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};
use crate::services::sources::{SiteConditions, WeatherSource};

use super::{ensure_success, http_client};

/// Weather API client
#[derive(Clone)]
pub struct OpenMeteoWeatherClient {
    client: Client,
    base_url: String,
    rainfall_window_days: u32,
}

/// Open-Meteo forecast response (daily precipitation only)
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    elevation: Option<f64>,
    #[serde(default)]
    daily: Option<DailySeries>,
}

#[derive(Debug, Deserialize)]
struct DailySeries {
    #[serde(default)]
    precipitation_sum: Vec<Option<f64>>,
}

/// Sum the first `past_days` daily totals (the past window precedes the
/// forecast days in the series)
fn past_rainfall(response: &ForecastResponse, past_days: u32) -> Option<f64> {
    let daily = response.daily.as_ref()?;
    let values: Vec<f64> = daily
        .precipitation_sum
        .iter()
        .take(past_days as usize)
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum())
    }
}

pub fn convert_response(response: &ForecastResponse, past_days: u32) -> SiteConditions {
    SiteConditions {
        weather: WeatherSummary {
            rainfall_30d_mm: past_rainfall(response, past_days),
        },
        terrain: TerrainSummary {
            elevation_m: response.elevation.filter(|e| e.is_finite()),
            slope_deg: None,
        },
    }
}

impl OpenMeteoWeatherClient {
    pub fn new(config: &WeatherConfig) -> AppResult<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            base_url: config.base_url.clone(),
            rainfall_window_days: config.rainfall_window_days,
        })
    }

    pub async fn get_forecast(&self, lat: f64, lon: f64) -> AppResult<ForecastResponse> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("daily", "precipitation_sum".to_string()),
                ("past_days", self.rainfall_window_days.to_string()),
                ("forecast_days", "1".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Weather API request failed: {}", e)))?;

        ensure_success("Weather API", response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse weather response: {}", e)))
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoWeatherClient {
    async fn fetch_conditions(&self, lat: f64, lon: f64) -> SiteConditions {
        match self.get_forecast(lat, lon).await {
            Ok(response) => convert_response(&response, self.rainfall_window_days),
            Err(e) => {
                tracing::warn!(lat, lon, "Weather and terrain unavailable: {}", e);
                SiteConditions::default()
            }
        }
    }
}
