//! WebAssembly module for the Soil Assessment dashboard
//!
//! Provides client-side computation for:
//! - Heuristic nutrient estimates from a feature vector
//! - Confidence labels and recommendation text
//! - Field area and centroid from drawn GeoJSON
//! - Coordinate and depth validation

use std::collections::HashMap;

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::{run_heuristics, score, synthesize, Geometry};

/// Heuristic estimates for a JSON feature vector, as JSON keyed by code
#[wasm_bindgen]
pub fn estimate_nutrients(features_json: &str) -> Result<String, JsValue> {
    heuristic_estimates_json(features_json).map_err(|e| JsValue::from_str(&e))
}

/// Confidence label ("high", "medium", "low") for a numeric score
#[wasm_bindgen]
pub fn confidence_label(score: f64) -> String {
    ConfidenceLabel::from_score(score).to_string()
}

/// Confidence report for a JSON estimate map, as JSON
#[wasm_bindgen]
pub fn confidence_report(estimates_json: &str) -> Result<String, JsValue> {
    let estimates = parse_estimates(estimates_json).map_err(|e| JsValue::from_str(&e))?;
    serde_json::to_string(&score(&estimates)).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Recommendation text for a JSON estimate map
#[wasm_bindgen]
pub fn recommendation(estimates_json: &str) -> Result<String, JsValue> {
    recommendation_text(estimates_json).map_err(|e| JsValue::from_str(&e))
}

/// Geodesic area in hectares of a drawn GeoJSON area
#[wasm_bindgen]
pub fn area_hectares(geojson: &str) -> Result<f64, JsValue> {
    parse_geometry(geojson)
        .map(|g| g.area_hectares())
        .map_err(|e| JsValue::from_str(&e))
}

/// Centroid of a drawn GeoJSON area as `{"lon": .., "lat": ..}`
#[wasm_bindgen]
pub fn area_centroid(geojson: &str) -> Result<String, JsValue> {
    centroid_json(geojson).map_err(|e| JsValue::from_str(&e))
}

/// Check that a coordinate pair can be assessed
#[wasm_bindgen]
pub fn is_valid_location(lat: f64, lon: f64) -> bool {
    validate_coordinates(lat, lon).is_ok()
}

/// Check a requested soil depth in centimeters
#[wasm_bindgen]
pub fn is_valid_depth(depth_cm: u32) -> bool {
    validate_depth_cm(depth_cm).is_ok()
}

fn heuristic_estimates_json(features_json: &str) -> Result<String, String> {
    let features: FeatureVector = serde_json::from_str(features_json)
        .map_err(|e| format!("Invalid features JSON: {}", e))?;
    serde_json::to_string(&run_heuristics(&features)).map_err(|e| e.to_string())
}

/// Accepts any code casing ("ZN", "zn", "Zn"); unknown codes are ignored
fn parse_estimates(estimates_json: &str) -> Result<NutrientEstimates, String> {
    let raw: HashMap<String, NutrientEstimate> = serde_json::from_str(estimates_json)
        .map_err(|e| format!("Invalid estimates JSON: {}", e))?;
    Ok(raw
        .into_iter()
        .filter_map(|(code, estimate)| NutrientCode::parse(&code).map(|c| (c, estimate)))
        .collect())
}

fn recommendation_text(estimates_json: &str) -> Result<String, String> {
    let estimates = parse_estimates(estimates_json)?;
    let report = score(&estimates);
    Ok(synthesize(&estimates, report.overall_score))
}

fn parse_geometry(geojson: &str) -> Result<Geometry, String> {
    let value: serde_json::Value =
        serde_json::from_str(geojson).map_err(|e| format!("Invalid GeoJSON: {}", e))?;
    Geometry::from_geojson(&value).map_err(|e| e.to_string())
}

fn centroid_json(geojson: &str) -> Result<String, String> {
    let centroid = parse_geometry(geojson)?
        .centroid()
        .map_err(|e| e.to_string())?;
    serde_json::to_string(&centroid).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_label() {
        assert_eq!(confidence_label(0.9), "high");
        assert_eq!(confidence_label(0.6), "medium");
        assert_eq!(confidence_label(0.3), "low");
    }

    #[test]
    fn test_estimates_from_partial_features() {
        let json = heuristic_estimates_json(r#"{"pH_0_30": 6.8}"#).unwrap();
        let estimates: serde_json::Value = serde_json::from_str(&json).unwrap();
        let object = estimates.as_object().unwrap();
        assert_eq!(object.len(), 12);
        assert_eq!(estimates["pH"]["value"], 6.8);
        assert_eq!(estimates["N"]["method"], "heuristic");
    }

    #[test]
    fn test_bad_features_are_reported() {
        let err = heuristic_estimates_json("not json").unwrap_err();
        assert!(err.starts_with("Invalid features JSON"));
    }

    #[test]
    fn test_recommendation_normalizes_codes() {
        let json = r#"{
            "n": {"value": 120.0, "unit": "kg/ha", "confidence": 0.3, "method": "heuristic"},
            "P": {"value": 25.0, "unit": "kg/ha", "confidence": 0.3, "method": "heuristic"},
            "k": {"value": 180.0, "unit": "kg/ha", "confidence": 0.3, "method": "heuristic"}
        }"#;
        let text = recommendation_text(json).unwrap();
        assert!(text.contains("laboratory confirmation"));
        assert!(text.contains("N:120 kg/ha"));
    }

    #[test]
    fn test_area_helpers() {
        let square = r#"{"type": "Polygon", "coordinates": [[[77.0, 12.9], [77.001, 12.9], [77.001, 12.901], [77.0, 12.901]]]}"#;
        let geometry = parse_geometry(square).unwrap();
        assert!(geometry.area_hectares() > 1.0);

        let centroid: serde_json::Value = serde_json::from_str(&centroid_json(square).unwrap()).unwrap();
        assert!((centroid["lon"].as_f64().unwrap() - 77.0005).abs() < 1e-9);
        assert!((centroid["lat"].as_f64().unwrap() - 12.9005).abs() < 1e-9);
    }

    #[test]
    fn test_location_checks() {
        assert!(is_valid_location(18.52, 73.86));
        assert!(!is_valid_location(f64::NAN, 73.86));
        assert!(is_valid_depth(30));
        assert!(!is_valid_depth(0));
    }
}
