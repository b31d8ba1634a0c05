//! Location resolution: place text or raw coordinates to a canonical point

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use shared::{display_name, validate_coordinates, LocationQuery, ResolvedLocation};

use crate::error::{AppError, AppResult};

/// First geocoder hit for a text query
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeMatch {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub admin_region: Option<String>,
    pub country: Option<String>,
}

/// Text geocoding service
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the service has no match for `name`
    async fn search(&self, name: &str) -> AppResult<Option<GeocodeMatch>>;
}

/// Resolves place descriptors through tiered geocoder lookups, caching
/// successful resolutions by their exact place text
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    cache: Cache<String, ResolvedLocation>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, cache_capacity: usize) -> Self {
        Self {
            geocoder,
            cache: Cache::builder().max_capacity(cache_capacity as u64).build(),
        }
    }

    pub async fn resolve(&self, query: &LocationQuery) -> AppResult<ResolvedLocation> {
        if let Some(place) = query.place_text() {
            return self.resolve_place(query, place).await;
        }

        match (query.lat, query.lon) {
            (Some(lat), Some(lon)) => {
                validate_coordinates(lat, lon)
                    .map_err(|msg| AppError::InvalidCoordinates(msg.to_string()))?;
                Ok(ResolvedLocation::from_coordinates(lat, lon))
            }
            _ => Err(AppError::MissingLocation),
        }
    }

    async fn resolve_place(
        &self,
        query: &LocationQuery,
        place: String,
    ) -> AppResult<ResolvedLocation> {
        if let Some(hit) = self.cache.get(&place).await {
            tracing::debug!(place = %place, "Location cache hit");
            return Ok(hit);
        }

        let candidates = query.geocoding_candidates();
        let mut failures = 0usize;

        for candidate in &candidates {
            match self.geocoder.search(candidate).await {
                Ok(Some(found)) => {
                    if validate_coordinates(found.latitude, found.longitude).is_err() {
                        tracing::warn!(candidate = %candidate, "Geocoder returned unusable coordinates");
                        continue;
                    }
                    let resolved = ResolvedLocation {
                        latitude: found.latitude,
                        longitude: found.longitude,
                        display_name: display_name(
                            &found.name,
                            found.admin_region.as_deref(),
                            found.country.as_deref(),
                        ),
                    };
                    tracing::info!(
                        place = %place,
                        candidate = %candidate,
                        "Resolved location to {}",
                        resolved.display_name
                    );
                    self.cache.insert(place, resolved.clone()).await;
                    return Ok(resolved);
                }
                Ok(None) => {
                    tracing::debug!(candidate = %candidate, "No geocoder match");
                }
                Err(e) => {
                    failures += 1;
                    tracing::warn!(candidate = %candidate, "Geocoder lookup failed: {}", e);
                }
            }
        }

        if failures == candidates.len() {
            return Err(AppError::GeocoderUnavailable(format!(
                "all {} lookups for '{}' failed",
                failures, place
            )));
        }

        Err(AppError::LocationNotFound {
            query: query.clone(),
        })
    }
}
