//! Location queries and resolved locations

use serde::{Deserialize, Serialize};

/// A place descriptor, raw coordinates, or both.
///
/// Place text takes precedence over coordinates when both are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationQuery {
    #[serde(default)]
    pub village: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl LocationQuery {
    pub fn from_coordinates(lat: f64, lon: f64) -> Self {
        Self {
            lat: Some(lat),
            lon: Some(lon),
            ..Default::default()
        }
    }

    /// Non-blank place parts, most specific first
    pub fn place_parts(&self) -> Vec<&str> {
        [&self.village, &self.city, &self.state, &self.country]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect()
    }

    pub fn has_place(&self) -> bool {
        !self.place_parts().is_empty()
    }

    /// The joined place text, e.g. "Pune, Maharashtra, India"
    pub fn place_text(&self) -> Option<String> {
        let parts = self.place_parts();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }

    /// Ordered geocoder lookups: the full joined string, the most specific
    /// part alone, then most specific with least specific.
    pub fn geocoding_candidates(&self) -> Vec<String> {
        let parts = self.place_parts();
        let mut candidates: Vec<String> = Vec::with_capacity(3);

        let mut push = |candidate: String| {
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        };

        if let Some((first, rest)) = parts.split_first() {
            push(parts.join(", "));
            push(first.to_string());
            if let Some(last) = rest.last() {
                push(format!("{}, {}", first, last));
            }
        }

        candidates
    }
}

/// A canonical point with a human-readable name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

impl ResolvedLocation {
    pub fn from_coordinates(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            display_name: format!("{}, {}", latitude, longitude),
        }
    }
}

/// Join the structured geocoder fields into "name, region, country"
pub fn display_name(name: &str, admin_region: Option<&str>, country: Option<&str>) -> String {
    [Some(name), admin_region, country]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(village: &str, city: &str, state: &str, country: &str) -> LocationQuery {
        let opt = |s: &str| (!s.is_empty()).then(|| s.to_string());
        LocationQuery {
            village: opt(village),
            city: opt(city),
            state: opt(state),
            country: opt(country),
            ..Default::default()
        }
    }

    #[test]
    fn test_candidates_most_specific_first() {
        let query = place("X", "Y", "Z", "W");
        assert_eq!(
            query.geocoding_candidates(),
            vec!["X, Y, Z, W".to_string(), "X".to_string(), "X, W".to_string()]
        );
    }

    #[test]
    fn test_candidates_skip_empty_parts() {
        let query = place("", "Pune", "", "India");
        assert_eq!(
            query.geocoding_candidates(),
            vec!["Pune, India".to_string(), "Pune".to_string()]
        );
    }

    #[test]
    fn test_single_part_has_one_candidate() {
        let query = place("", "Akola", "", "");
        assert_eq!(query.geocoding_candidates(), vec!["Akola".to_string()]);
    }

    #[test]
    fn test_blank_parts_are_not_place_text() {
        let query = LocationQuery {
            city: Some("   ".to_string()),
            lat: Some(18.52),
            lon: Some(73.86),
            ..Default::default()
        };
        assert!(!query.has_place());
        assert!(query.geocoding_candidates().is_empty());
    }

    #[test]
    fn test_display_name_omits_empty_parts() {
        assert_eq!(
            display_name("Pune", Some("Maharashtra"), Some("India")),
            "Pune, Maharashtra, India"
        );
        assert_eq!(display_name("Pune", None, Some("India")), "Pune, India");
        assert_eq!(display_name("Pune", Some(""), None), "Pune");
    }

    #[test]
    fn test_coordinate_display_name() {
        let resolved = ResolvedLocation::from_coordinates(18.52, 73.86);
        assert_eq!(resolved.display_name, "18.52, 73.86");
    }
}
