//! Nutrient codes and estimates

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The twelve nutrient codes every assessment reports.
///
/// Variant order is the canonical reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NutrientCode {
    N,
    P,
    K,
    B,
    Zn,
    Fe,
    Mn,
    Cu,
    S,
    #[serde(rename = "OC")]
    Oc,
    #[serde(rename = "pH")]
    Ph,
    #[serde(rename = "EC")]
    Ec,
}

impl NutrientCode {
    pub const ALL: [NutrientCode; 12] = [
        NutrientCode::N,
        NutrientCode::P,
        NutrientCode::K,
        NutrientCode::B,
        NutrientCode::Zn,
        NutrientCode::Fe,
        NutrientCode::Mn,
        NutrientCode::Cu,
        NutrientCode::S,
        NutrientCode::Oc,
        NutrientCode::Ph,
        NutrientCode::Ec,
    ];

    /// Canonical wire form of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            NutrientCode::N => "N",
            NutrientCode::P => "P",
            NutrientCode::K => "K",
            NutrientCode::B => "B",
            NutrientCode::Zn => "Zn",
            NutrientCode::Fe => "Fe",
            NutrientCode::Mn => "Mn",
            NutrientCode::Cu => "Cu",
            NutrientCode::S => "S",
            NutrientCode::Oc => "OC",
            NutrientCode::Ph => "pH",
            NutrientCode::Ec => "EC",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            NutrientCode::N => "Nitrogen",
            NutrientCode::P => "Phosphorus",
            NutrientCode::K => "Potassium",
            NutrientCode::B => "Boron",
            NutrientCode::Zn => "Zinc",
            NutrientCode::Fe => "Iron",
            NutrientCode::Mn => "Manganese",
            NutrientCode::Cu => "Copper",
            NutrientCode::S => "Sulphur",
            NutrientCode::Oc => "Organic Carbon",
            NutrientCode::Ph => "pH",
            NutrientCode::Ec => "Electrical Conductivity",
        }
    }

    /// Normalize any casing of a code ("ZN", "zn", "Zn", "PH", ...) to the
    /// canonical variant.
    pub fn parse(raw: &str) -> Option<Self> {
        let upper = raw.trim().to_ascii_uppercase();
        NutrientCode::ALL
            .into_iter()
            .find(|code| code.as_str().to_ascii_uppercase() == upper)
    }
}

impl fmt::Display for NutrientCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which estimator produced a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimationMethod {
    Model,
    Heuristic,
}

impl EstimationMethod {
    /// Map an upstream method tag. Anything other than "heuristic" came from
    /// the model side ("ml", "model", "ensemble", ...).
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag.map(|t| t.trim().to_ascii_lowercase()) {
            Some(t) if t == "heuristic" => EstimationMethod::Heuristic,
            _ => EstimationMethod::Model,
        }
    }
}

/// A single nutrient estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientEstimate {
    pub value: Option<f64>,
    pub unit: String,
    /// Numeric confidence in [0, 1]; `None` when the estimator did not report one
    pub confidence: Option<f64>,
    pub method: EstimationMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_deviation: Option<f64>,
}

impl NutrientEstimate {
    pub fn heuristic(value: f64, unit: &str, confidence: f64) -> Self {
        Self {
            value: Some(value),
            unit: unit.to_string(),
            confidence: Some(confidence),
            method: EstimationMethod::Heuristic,
            standard_deviation: None,
        }
    }
}

/// Estimates keyed by canonical code, iterated in canonical order
pub type NutrientEstimates = BTreeMap<NutrientCode, NutrientEstimate>;
