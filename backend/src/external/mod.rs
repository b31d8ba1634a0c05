//! External API integrations

pub mod geocoding;
pub mod nutrient_model;
pub mod sentinel_hub;
pub mod soilgrids;
pub mod weather;

pub use geocoding::OpenMeteoGeocoder;
pub use nutrient_model::NutrientModelClient;
pub use sentinel_hub::SentinelHubClient;
pub use soilgrids::SoilGridsClient;
pub use weather::OpenMeteoWeatherClient;

use std::time::Duration;

use reqwest::Client;

use crate::error::{AppError, AppResult};

/// Build an HTTP client with a request timeout
pub(crate) fn http_client(timeout_secs: u64) -> AppResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

/// Turn a non-2xx response into an `ExternalService` error
pub(crate) async fn ensure_success(
    service: &str,
    response: reqwest::Response,
) -> AppResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(AppError::ExternalService(format!(
        "{} returned {}: {}",
        service, status, body
    )))
}
