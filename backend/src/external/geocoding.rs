//! Open-Meteo geocoding client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::config::GeocodingConfig;
use crate::error::{AppError, AppResult};
use crate::services::location::{GeocodeMatch, Geocoder};

use super::{ensure_success, http_client};

/// Text geocoder backed by the Open-Meteo search API
#[derive(Clone)]
pub struct OpenMeteoGeocoder {
    client: Client,
    base_url: String,
    language: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Option<Vec<SearchResult>>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    latitude: f64,
    longitude: f64,
    name: String,
    #[serde(default)]
    admin1: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl From<SearchResult> for GeocodeMatch {
    fn from(r: SearchResult) -> Self {
        GeocodeMatch {
            latitude: r.latitude,
            longitude: r.longitude,
            name: r.name,
            admin_region: r.admin1,
            country: r.country,
        }
    }
}

impl OpenMeteoGeocoder {
    pub fn new(config: &GeocodingConfig) -> AppResult<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            base_url: config.base_url.clone(),
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for OpenMeteoGeocoder {
    async fn search(&self, name: &str) -> AppResult<Option<GeocodeMatch>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("name", name),
                ("count", "1"),
                ("language", self.language.as_str()),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Geocoding request failed: {}", e)))?;

        let data: SearchResponse = ensure_success("Geocoder", response)
            .await?
            .json()
            .await
            .map_err(|e| {
                AppError::ExternalService(format!("Failed to parse geocoding response: {}", e))
            })?;

        Ok(data
            .results
            .and_then(|results| results.into_iter().next())
            .map(GeocodeMatch::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let data: SearchResponse = serde_json::from_str(
            r#"{"results":[{"id":1259229,"name":"Pune","latitude":18.51957,"longitude":73.85535,
                "admin1":"Maharashtra","country":"India"}],"generationtime_ms":0.5}"#,
        )
        .unwrap();
        let m: GeocodeMatch = data.results.unwrap().remove(0).into();
        assert_eq!(m.name, "Pune");
        assert_eq!(m.admin_region.as_deref(), Some("Maharashtra"));
        assert!((m.latitude - 18.51957).abs() < 1e-9);
    }

    #[test]
    fn test_parse_empty_response() {
        let data: SearchResponse = serde_json::from_str(r#"{"generationtime_ms":0.2}"#).unwrap();
        assert!(data.results.is_none());
    }
}
