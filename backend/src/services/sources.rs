//! Upstream data sources feeding the assessment pipeline.
//!
//! Every source is infallible from the pipeline's point of view: a failed
//! upstream call degrades to a summary with null fields.

use async_trait::async_trait;
use shared::{DateRange, Geometry, IndexSummary, SoilBaseline, TerrainSummary, WeatherSummary};

#[async_trait]
pub trait SoilBaselineSource: Send + Sync {
    async fn fetch_baseline(&self, lat: f64, lon: f64, depth_cm: u32) -> SoilBaseline;
}

#[async_trait]
pub trait VegetationIndexSource: Send + Sync {
    async fn fetch_indices(&self, geometry: &Geometry, range: DateRange) -> IndexSummary;
}

#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_conditions(&self, lat: f64, lon: f64) -> SiteConditions;
}

/// Recent weather and terrain at a point
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteConditions {
    pub weather: WeatherSummary,
    pub terrain: TerrainSummary,
}
