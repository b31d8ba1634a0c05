//! In-process stand-ins for the upstream services
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shared::{
    DateRange, FeatureVector, Geometry, IndexSummary, SoilBaseline, TerrainSummary,
    WeatherSummary,
};
use soil_assessment_backend::error::{AppError, AppResult};
use soil_assessment_backend::services::{
    GeocodeMatch, Geocoder, LocationResolver, ModelResponse, NutrientModel, PredictionEngine,
    SiteConditions, SoilAssessmentService, SoilBaselineSource, VegetationIndexSource,
    WeatherSource,
};

pub struct FixedSoil(pub SoilBaseline);

#[async_trait]
impl SoilBaselineSource for FixedSoil {
    async fn fetch_baseline(&self, _lat: f64, _lon: f64, depth_cm: u32) -> SoilBaseline {
        let mut baseline = self.0.clone();
        baseline.ph.depth_cm = depth_cm;
        baseline
    }
}

/// Behaves like a vegetation source whose upstream is down
pub struct UnreachableVegetation;

#[async_trait]
impl VegetationIndexSource for UnreachableVegetation {
    async fn fetch_indices(&self, _geometry: &Geometry, _range: DateRange) -> IndexSummary {
        IndexSummary::unavailable()
    }
}

/// Records every geometry it is asked about
#[derive(Default)]
pub struct RecordingVegetation {
    pub seen: Mutex<Vec<(Geometry, DateRange)>>,
    pub summary: IndexSummary,
}

#[async_trait]
impl VegetationIndexSource for RecordingVegetation {
    async fn fetch_indices(&self, geometry: &Geometry, range: DateRange) -> IndexSummary {
        self.seen.lock().unwrap().push((geometry.clone(), range));
        self.summary.clone()
    }
}

pub struct CalmWeather;

#[async_trait]
impl WeatherSource for CalmWeather {
    async fn fetch_conditions(&self, _lat: f64, _lon: f64) -> SiteConditions {
        SiteConditions {
            weather: WeatherSummary {
                rainfall_30d_mm: Some(42.0),
            },
            terrain: TerrainSummary {
                elevation_m: Some(560.0),
                slope_deg: None,
            },
        }
    }
}

pub struct UnreachableModel;

#[async_trait]
impl NutrientModel for UnreachableModel {
    async fn predict(&self, _features: &FeatureVector) -> AppResult<ModelResponse> {
        Err(AppError::ExternalService("connection refused".to_string()))
    }
}

/// Answers only for the place names it knows
#[derive(Default)]
pub struct MapGeocoder {
    pub places: HashMap<String, GeocodeMatch>,
    pub calls: Mutex<Vec<String>>,
}

impl MapGeocoder {
    pub fn with(name: &str, latitude: f64, longitude: f64) -> Self {
        let mut places = HashMap::new();
        places.insert(
            name.to_string(),
            GeocodeMatch {
                latitude,
                longitude,
                name: name.to_string(),
                admin_region: Some("Maharashtra".to_string()),
                country: Some("India".to_string()),
            },
        );
        Self {
            places,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Geocoder for MapGeocoder {
    async fn search(&self, name: &str) -> AppResult<Option<GeocodeMatch>> {
        self.calls.lock().unwrap().push(name.to_string());
        Ok(self.places.get(name).cloned())
    }
}

pub fn baseline_with_ph(ph: f64) -> SoilBaseline {
    let mut baseline = SoilBaseline::unavailable(30);
    baseline.ph.value = Some(ph);
    baseline
}

/// Pipeline with a pH 6.8 baseline, no vegetation data and no model
pub fn heuristic_service() -> SoilAssessmentService {
    service_with(
        Arc::new(MapGeocoder::default()),
        Arc::new(UnreachableVegetation),
        PredictionEngine::heuristic_only(),
    )
}

pub fn service_with(
    geocoder: Arc<dyn Geocoder>,
    vegetation: Arc<dyn VegetationIndexSource>,
    engine: PredictionEngine,
) -> SoilAssessmentService {
    SoilAssessmentService::new(
        LocationResolver::new(geocoder, 64),
        Arc::new(FixedSoil(baseline_with_ph(6.8))),
        vegetation,
        Arc::new(CalmWeather),
        engine,
    )
}
