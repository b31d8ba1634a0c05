//! Soil assessment pipeline
//!
//! centroid → (baseline ∥ indices ∥ weather) → features → predict → score → recommend

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::{
    assemble, score, synthesize, validate_depth_cm, AssessmentMeta,
    AssessmentResult, Centroid, DateRange, Geometry, LocationQuery,
};

use super::location::LocationResolver;
use super::prediction::PredictionEngine;
use super::sources::{SoilBaselineSource, VegetationIndexSource, WeatherSource};
use crate::error::{AppError, AppResult};

/// Caller-tunable pipeline options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssessmentOptions {
    pub requested_depth_cm: Option<u32>,
    pub crop_type: Option<String>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
}

/// A queued area assessment. The area stays raw GeoJSON until a worker
/// picks it up.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentRequest {
    pub area: Value,
    pub options: AssessmentOptions,
}

/// What the job workers run
#[async_trait]
pub trait AreaAssessor: Send + Sync {
    async fn assess_request(&self, request: AssessmentRequest) -> AppResult<AssessmentResult>;
}

pub struct SoilAssessmentService {
    resolver: LocationResolver,
    soil: Arc<dyn SoilBaselineSource>,
    vegetation: Arc<dyn VegetationIndexSource>,
    weather: Arc<dyn WeatherSource>,
    engine: PredictionEngine,
    default_depth_cm: u32,
    lookback_days: i64,
}

impl SoilAssessmentService {
    pub fn new(
        resolver: LocationResolver,
        soil: Arc<dyn SoilBaselineSource>,
        vegetation: Arc<dyn VegetationIndexSource>,
        weather: Arc<dyn WeatherSource>,
        engine: PredictionEngine,
    ) -> Self {
        Self {
            resolver,
            soil,
            vegetation,
            weather,
            engine,
            default_depth_cm: 30,
            lookback_days: 90,
        }
    }

    pub fn with_defaults(mut self, default_depth_cm: u32, lookback_days: i64) -> Self {
        self.default_depth_cm = default_depth_cm;
        self.lookback_days = lookback_days;
        self
    }

    pub fn has_model(&self) -> bool {
        self.engine.has_model()
    }

    /// Resolve a place descriptor (or coordinates) and assess the point
    pub async fn assess_location(
        &self,
        query: &LocationQuery,
        options: &AssessmentOptions,
    ) -> AppResult<AssessmentResult> {
        let location = self.resolver.resolve(query).await?;
        let centroid = Centroid {
            lon: location.longitude,
            lat: location.latitude,
        };
        let geometry = Geometry::point(centroid.lon, centroid.lat);
        self.run(
            centroid,
            &geometry,
            None,
            Some(location.display_name),
            options,
        )
        .await
    }

    /// Assess a polygon (or point) area
    pub async fn assess_area(
        &self,
        geometry: &Geometry,
        options: &AssessmentOptions,
    ) -> AppResult<AssessmentResult> {
        let centroid = geometry.centroid()?;
        let area = geometry.area_hectares();
        let area = (area > 0.0).then_some(area);
        self.run(centroid, geometry, area, None, options).await
    }

    async fn run(
        &self,
        centroid: Centroid,
        geometry: &Geometry,
        area_hectares: Option<f64>,
        location_name: Option<String>,
        options: &AssessmentOptions,
    ) -> AppResult<AssessmentResult> {
        let depth_cm = options.requested_depth_cm.unwrap_or(self.default_depth_cm);
        validate_depth_cm(depth_cm).map_err(|msg| AppError::validation("requestedDepthCm", msg))?;

        let now = Utc::now();
        let range = DateRange::resolve(options.from_date, options.to_date, now, self.lookback_days);
        if !range.is_ordered() {
            return Err(AppError::validation("fromDate", "fromDate must be before toDate"));
        }

        tracing::debug!(
            lat = centroid.lat,
            lon = centroid.lon,
            depth_cm,
            "Fetching soil, vegetation and weather signals"
        );

        let (baseline, indices, conditions) = tokio::join!(
            self.soil.fetch_baseline(centroid.lat, centroid.lon, depth_cm),
            self.vegetation.fetch_indices(geometry, range),
            self.weather.fetch_conditions(centroid.lat, centroid.lon),
        );

        if baseline.is_empty() {
            tracing::warn!(lat = centroid.lat, lon = centroid.lon, "Soil baseline unavailable");
        }
        if !indices.has_signal() {
            tracing::debug!("No usable satellite observations in window");
        }

        let meta = AssessmentMeta {
            area_hectares,
            crop_type: options.crop_type.clone(),
        };
        let features = assemble(
            &baseline,
            &indices,
            &conditions.terrain,
            &conditions.weather,
            &meta,
        );

        let estimates = self.engine.predict(&features).await;
        let confidence_report = score(&estimates);
        let recommendation = synthesize(&estimates, confidence_report.overall_score);

        tracing::info!(
            lat = centroid.lat,
            lon = centroid.lon,
            overall = %confidence_report.overall,
            "Assessment complete"
        );

        Ok(AssessmentResult {
            centroid,
            location_name,
            area_hectares: area_hectares.unwrap_or(0.0),
            crop_type: features.crop_type,
            soil_baseline: baseline,
            index_summary: indices,
            weather: conditions.weather,
            terrain: conditions.terrain,
            nutrient_estimates: estimates,
            confidence_report,
            recommendation,
            timestamp: now,
        })
    }
}

#[async_trait]
impl AreaAssessor for SoilAssessmentService {
    async fn assess_request(&self, request: AssessmentRequest) -> AppResult<AssessmentResult> {
        let geometry = Geometry::from_geojson(&request.area)?;
        self.assess_area(&geometry, &request.options).await
    }
}
