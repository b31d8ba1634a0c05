//! Rule-based nutrient estimator used when the model is unavailable
//!
//! Every rule is a fixed threshold over the feature vector. The estimator is
//! total: any feature vector, including an all-null one, yields all twelve
//! nutrient codes with a value and a unit.

use crate::models::{FeatureVector, NutrientCode, NutrientEstimate, NutrientEstimates};

/// Upper bound on any heuristic confidence
pub const HEURISTIC_CONFIDENCE_CAP: f64 = 0.75;

/// Organic carbon (%) below which soil is treated as carbon-poor
pub const LOW_SOC_PCT: f64 = 0.6;

/// Mean NDVI below which vegetation is treated as sparse
pub const LOW_NDVI: f64 = 0.35;

/// pH above which Fe, Zn and Mn availability drops
pub const ALKALINE_PH: f64 = 7.5;

/// Clay fraction (%) above which potassium retention is higher
pub const HEAVY_CLAY_PCT: f64 = 35.0;

pub fn run_heuristics(features: &FeatureVector) -> NutrientEstimates {
    let soc = features.soc_0_30.filter(|v| *v > 0.0);
    let ndvi = features.ndvi_mean_90d.unwrap_or(0.0);
    let ph = features.ph_0_30;
    let alkaline = ph.map(|p| p > ALKALINE_PH).unwrap_or(false);
    let heavy_clay = features.clay.map(|c| c > HEAVY_CLAY_PCT).unwrap_or(false);

    let mut out = NutrientEstimates::new();

    let nitrogen = if soc.unwrap_or(0.0) < LOW_SOC_PCT && ndvi < LOW_NDVI {
        NutrientEstimate::heuristic(120.0, "kg/ha", 0.45)
    } else {
        NutrientEstimate::heuristic(200.0, "kg/ha", 0.6)
    };
    out.insert(NutrientCode::N, nitrogen);
    out.insert(NutrientCode::P, NutrientEstimate::heuristic(25.0, "kg/ha", 0.4));

    let potassium = if heavy_clay { 240.0 } else { 180.0 };
    out.insert(
        NutrientCode::K,
        NutrientEstimate::heuristic(potassium, "kg/ha", 0.45),
    );

    out.insert(
        NutrientCode::Oc,
        match soc {
            Some(v) => NutrientEstimate::heuristic(v, "%", 0.7),
            None => NutrientEstimate::heuristic(0.8, "%", 0.4),
        },
    );
    out.insert(
        NutrientCode::Ph,
        match ph {
            Some(v) => NutrientEstimate::heuristic(v, "pH", HEURISTIC_CONFIDENCE_CAP),
            None => NutrientEstimate::heuristic(6.5, "pH", 0.4),
        },
    );

    out.insert(NutrientCode::Ec, NutrientEstimate::heuristic(0.5, "dS/m", 0.5));
    out.insert(NutrientCode::S, NutrientEstimate::heuristic(12.0, "mg/kg", 0.45));

    let (fe, zn, mn) = if alkaline {
        (20.0, 0.9, 25.0)
    } else {
        (35.0, 1.5, 40.0)
    };
    out.insert(NutrientCode::Fe, NutrientEstimate::heuristic(fe, "mg/kg", 0.6));
    out.insert(NutrientCode::Zn, NutrientEstimate::heuristic(zn, "mg/kg", 0.5));
    out.insert(NutrientCode::Mn, NutrientEstimate::heuristic(mn, "mg/kg", 0.6));
    out.insert(NutrientCode::Cu, NutrientEstimate::heuristic(0.8, "mg/kg", 0.5));
    out.insert(NutrientCode::B, NutrientEstimate::heuristic(0.5, "mg/kg", 0.45));

    out
}
