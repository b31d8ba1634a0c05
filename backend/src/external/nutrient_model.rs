//! Nutrient prediction service client

use async_trait::async_trait;
use reqwest::Client;
use shared::FeatureVector;

use crate::error::{AppError, AppResult};
use crate::services::prediction::{ModelResponse, NutrientModel};

/// Client for the external nutrient estimation model
#[derive(Clone)]
pub struct NutrientModelClient {
    endpoint: String,
    http_client: Client,
}

impl NutrientModelClient {
    /// The request timeout is enforced by the prediction engine, not here
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            http_client: Client::new(),
        }
    }
}

#[async_trait]
impl NutrientModel for NutrientModelClient {
    async fn predict(&self, features: &FeatureVector) -> AppResult<ModelResponse> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(features)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Model request failed: {}", e)))?;

        super::ensure_success("Nutrient model", response)
            .await?
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to parse model response: {}", e)))
    }
}
