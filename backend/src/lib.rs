//! Soil assessment service
//!
//! Resolves a location or area, gathers soil, vegetation and weather signals,
//! estimates twelve nutrients (model first, heuristics as fallback) and
//! reports them with confidence labels and a recommendation, either
//! synchronously or as a pollable job.

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;

use error::AppResult;
use external::{
    NutrientModelClient, OpenMeteoGeocoder, OpenMeteoWeatherClient, SentinelHubClient,
    SoilGridsClient,
};
use services::{
    AreaAssessor, InMemoryJobStore, JobManager, LocationResolver, NutrientModel, PredictionEngine,
    SoilAssessmentService,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub assessments: Arc<SoilAssessmentService>,
    pub jobs: Arc<JobManager>,
}

impl AppState {
    pub fn new(assessments: Arc<SoilAssessmentService>, jobs: Arc<JobManager>) -> Self {
        Self { assessments, jobs }
    }

    /// Wire the upstream clients, the pipeline and the job workers.
    /// Spawns tasks, so it must run inside a tokio runtime.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let geocoder = Arc::new(OpenMeteoGeocoder::new(&config.geocoding)?);
        let resolver = LocationResolver::new(geocoder, config.geocoding.cache_capacity);

        let model = config
            .prediction
            .url
            .as_ref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| Arc::new(NutrientModelClient::new(url.clone())) as Arc<dyn NutrientModel>);
        if model.is_none() {
            tracing::warn!("No prediction model configured; heuristic estimates only");
        }
        let engine = PredictionEngine::new(
            model,
            Duration::from_secs(config.prediction.timeout_secs),
        );

        let vegetation = SentinelHubClient::new(&config.sentinel_hub)?;
        if !vegetation.is_configured() {
            tracing::warn!("No Sentinel Hub token configured; vegetation indices disabled");
        }

        let assessments = Arc::new(
            SoilAssessmentService::new(
                resolver,
                Arc::new(SoilGridsClient::new(&config.soil_grids)?),
                Arc::new(vegetation),
                Arc::new(OpenMeteoWeatherClient::new(&config.weather)?),
                engine,
            )
            .with_defaults(
                config.soil_grids.default_depth_cm,
                config.sentinel_hub.lookback_days,
            ),
        );

        let jobs = Arc::new(JobManager::start(
            Arc::new(InMemoryJobStore::new()),
            assessments.clone() as Arc<dyn AreaAssessor>,
            &config.jobs,
        ));

        Ok(Self::new(assessments, jobs))
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .merge(routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Soil Assessment API v1"
}
