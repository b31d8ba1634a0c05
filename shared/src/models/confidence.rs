//! Qualitative confidence labels

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::nutrient::{NutrientCode, NutrientEstimates};

pub const HIGH_CONFIDENCE: f64 = 0.7;
pub const MEDIUM_CONFIDENCE: f64 = 0.5;

/// Confidence assumed when an estimator reports none
pub const DEFAULT_CONFIDENCE: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLabel {
    Low,
    Medium,
    High,
}

impl ConfidenceLabel {
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_CONFIDENCE {
            ConfidenceLabel::High
        } else if score >= MEDIUM_CONFIDENCE {
            ConfidenceLabel::Medium
        } else {
            ConfidenceLabel::Low
        }
    }
}

impl fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceLabel::Low => write!(f, "low"),
            ConfidenceLabel::Medium => write!(f, "medium"),
            ConfidenceLabel::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceReport {
    pub overall: ConfidenceLabel,
    /// Mean of the per-nutrient numeric confidences
    pub overall_score: f64,
    pub per_nutrient: BTreeMap<NutrientCode, ConfidenceLabel>,
}

fn numeric_confidence(confidence: Option<f64>) -> f64 {
    match confidence {
        Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
        _ => DEFAULT_CONFIDENCE,
    }
}

/// Mean numeric confidence, missing values counted as [`DEFAULT_CONFIDENCE`].
/// An empty set scores 0.
pub fn average_confidence(estimates: &NutrientEstimates) -> f64 {
    if estimates.is_empty() {
        return 0.0;
    }
    let sum: f64 = estimates
        .values()
        .map(|e| numeric_confidence(e.confidence))
        .sum();
    sum / estimates.len() as f64
}

pub fn score(estimates: &NutrientEstimates) -> ConfidenceReport {
    let per_nutrient = estimates
        .iter()
        .map(|(code, estimate)| {
            (
                *code,
                ConfidenceLabel::from_score(numeric_confidence(estimate.confidence)),
            )
        })
        .collect();
    let overall_score = average_confidence(estimates);

    ConfidenceReport {
        overall: ConfidenceLabel::from_score(overall_score),
        overall_score,
        per_nutrient,
    }
}
