//! Validation utilities for assessment inputs

/// Deepest soil interval the baseline source can report
pub const MAX_DEPTH_CM: u32 = 200;

/// Validate that a coordinate pair is finite and on the globe
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), &'static str> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err("Latitude and longitude must be finite numbers");
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err("Latitude must be between -90 and 90");
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

/// Validate a requested soil depth in centimeters
pub fn validate_depth_cm(depth_cm: u32) -> Result<(), &'static str> {
    if depth_cm == 0 || depth_cm > MAX_DEPTH_CM {
        return Err("Requested depth must be between 1 and 200 cm");
    }
    Ok(())
}
