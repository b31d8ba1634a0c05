//! Nutrient prediction with heuristic fallback

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use shared::{
    run_heuristics, EstimationMethod, FeatureVector, NutrientCode, NutrientEstimate,
    NutrientEstimates,
};

use crate::error::AppResult;

/// Response contract of the external nutrient model
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub predictions: Option<HashMap<String, ModelPrediction>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelPrediction {
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default, alias = "standard_deviation", alias = "std")]
    pub standard_deviation: Option<f64>,
}

/// The opaque primary estimator
#[async_trait]
pub trait NutrientModel: Send + Sync {
    async fn predict(&self, features: &FeatureVector) -> AppResult<ModelResponse>;
}

/// Produces the twelve nutrient estimates for a feature vector.
///
/// The model is consulted first when configured. A timeout, transport
/// error, unsuccessful response or a response with no recognizable codes
/// yields the heuristic estimates unchanged. Codes the model leaves out are
/// filled from the heuristic estimates.
pub struct PredictionEngine {
    model: Option<Arc<dyn NutrientModel>>,
    timeout: Duration,
}

impl PredictionEngine {
    pub fn new(model: Option<Arc<dyn NutrientModel>>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// Heuristic-only engine
    pub fn heuristic_only() -> Self {
        Self::new(None, Duration::from_secs(0))
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub async fn predict(&self, features: &FeatureVector) -> NutrientEstimates {
        let heuristic = run_heuristics(features);

        let Some(model) = &self.model else {
            return heuristic;
        };

        let response = match tokio::time::timeout(self.timeout, model.predict(features)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!("Nutrient model unavailable, using heuristics: {}", e);
                return heuristic;
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Nutrient model timed out, using heuristics"
                );
                return heuristic;
            }
        };

        match accept_model_response(response) {
            Some(predicted) => merge_with_heuristics(predicted, heuristic),
            None => {
                tracing::warn!("Nutrient model returned an unusable response, using heuristics");
                heuristic
            }
        }
    }
}

/// Normalize a model response into canonical estimates, or `None` when it
/// does not qualify as a successful answer
fn accept_model_response(response: ModelResponse) -> Option<NutrientEstimates> {
    if !response.success {
        return None;
    }
    let predictions = response.predictions.filter(|p| !p.is_empty())?;

    let mut estimates = NutrientEstimates::new();
    for (raw_code, prediction) in predictions {
        let Some(code) = NutrientCode::parse(&raw_code) else {
            tracing::debug!(code = %raw_code, "Dropping unknown nutrient code from model");
            continue;
        };
        estimates.insert(
            code,
            NutrientEstimate {
                value: prediction.value.filter(|v| v.is_finite()),
                unit: prediction.unit.unwrap_or_default(),
                confidence: prediction
                    .confidence
                    .filter(|c| c.is_finite())
                    .map(|c| c.clamp(0.0, 1.0)),
                method: EstimationMethod::from_tag(prediction.method.as_deref()),
                standard_deviation: prediction.standard_deviation.filter(|s| s.is_finite()),
            },
        );
    }

    (!estimates.is_empty()).then_some(estimates)
}

fn merge_with_heuristics(
    mut predicted: NutrientEstimates,
    heuristic: NutrientEstimates,
) -> NutrientEstimates {
    for (code, fallback) in heuristic {
        match predicted.get_mut(&code) {
            Some(estimate) if estimate.unit.trim().is_empty() => {
                estimate.unit = fallback.unit;
            }
            Some(_) => {}
            None => {
                tracing::debug!(code = %code, "Model omitted nutrient, filling from heuristics");
                predicted.insert(code, fallback);
            }
        }
    }
    predicted
}
