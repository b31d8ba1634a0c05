//! Configuration management for the soil assessment service
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with SOIL_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Log output configuration
    pub logging: LoggingConfig,

    /// Text geocoder configuration
    pub geocoding: GeocodingConfig,

    /// Soil properties service configuration
    pub soil_grids: SoilGridsConfig,

    /// Satellite statistics service configuration
    pub sentinel_hub: SentinelHubConfig,

    /// Weather and elevation service configuration
    pub weather: WeatherConfig,

    /// Nutrient prediction model configuration
    pub prediction: PredictionConfig,

    /// Assessment job queue configuration
    pub jobs: JobsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// "pretty" or "json"
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingConfig {
    /// Search endpoint of the geocoder
    pub base_url: String,

    /// Language requested for result names
    pub language: String,

    pub timeout_secs: u64,

    /// Maximum number of cached resolutions (0 disables the cache)
    pub cache_capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SoilGridsConfig {
    /// Point query endpoint
    pub base_url: String,

    pub timeout_secs: u64,

    /// Depth used when a request does not name one
    pub default_depth_cm: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SentinelHubConfig {
    /// Statistics endpoint returning pre-aggregated index summaries
    pub statistics_url: String,

    /// Bearer token; without one vegetation indices are skipped
    pub token: Option<String>,

    pub timeout_secs: u64,

    /// Default observation window in days
    pub lookback_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Forecast endpoint (also reports grid elevation)
    pub base_url: String,

    pub timeout_secs: u64,

    /// Days of past precipitation summed into the rainfall feature
    pub rainfall_window_days: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PredictionConfig {
    /// Model endpoint; without one only the heuristic estimator runs
    pub url: Option<String>,

    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JobsConfig {
    /// Number of pipeline workers
    pub workers: usize,

    /// Pending submissions accepted before rejecting new ones
    pub queue_capacity: usize,

    /// How long terminal jobs stay retrievable
    pub retention_secs: u64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("SOIL_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("logging.format", "pretty")?
            .set_default(
                "geocoding.base_url",
                "https://geocoding-api.open-meteo.com/v1/search",
            )?
            .set_default("geocoding.language", "en")?
            .set_default("geocoding.timeout_secs", 10)?
            .set_default("geocoding.cache_capacity", 1024)?
            .set_default(
                "soil_grids.base_url",
                "https://rest.isric.org/soilgrids/v2.0/properties/query",
            )?
            .set_default("soil_grids.timeout_secs", 20)?
            .set_default("soil_grids.default_depth_cm", 30)?
            .set_default(
                "sentinel_hub.statistics_url",
                "https://services.sentinel-hub.com/api/v1/statistics",
            )?
            .set_default("sentinel_hub.timeout_secs", 30)?
            .set_default("sentinel_hub.lookback_days", 90)?
            .set_default("weather.base_url", "https://api.open-meteo.com/v1/forecast")?
            .set_default("weather.timeout_secs", 10)?
            .set_default("weather.rainfall_window_days", 30)?
            .set_default("prediction.timeout_secs", 15)?
            .set_default("jobs.workers", 4)?
            .set_default("jobs.queue_capacity", 64)?
            .set_default("jobs.retention_secs", 86400)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (SOIL_ prefix)
            .add_source(
                Environment::with_prefix("SOIL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
