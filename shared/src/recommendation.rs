//! Natural-language recommendation text

use crate::models::{NutrientCode, NutrientEstimates};

/// Overall confidence below which laboratory confirmation is advised
pub const LAB_CONFIRMATION_THRESHOLD: f64 = 0.6;

pub fn synthesize(estimates: &NutrientEstimates, overall_confidence: f64) -> String {
    let mut text = if overall_confidence < LAB_CONFIRMATION_THRESHOLD {
        String::from("Provisional estimates; recommend laboratory confirmation.")
    } else {
        String::from("Provisional recommendations based on model.")
    };

    let npk: Option<Vec<String>> = [NutrientCode::N, NutrientCode::P, NutrientCode::K]
        .iter()
        .map(|code| {
            let estimate = estimates.get(code)?;
            let value = estimate.value.filter(|v| v.is_finite())?;
            Some(format!("{}:{} {}", code, value.round(), estimate.unit))
        })
        .collect();

    if let Some(parts) = npk {
        text.push_str(&format!(" Estimated {}.", parts.join(", ")));
    }

    text
}
