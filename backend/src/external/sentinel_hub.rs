//! Sentinel Hub Statistical API client
//!
//! Requests per-interval NDVI/NDRE/BSI statistics for an area instead of
//! raw imagery and reduces them to one [`IndexSummary`]. Cloudy pixels are
//! masked in the evalscript, so they show up as no-data samples.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use shared::{DateRange, Geometry, IndexSummary};

use crate::config::SentinelHubConfig;
use crate::error::{AppError, AppResult};
use crate::services::sources::VegetationIndexSource;

use super::{ensure_success, http_client};

/// Length of each statistics interval inside the observation window
const AGGREGATION_DAYS: i64 = 10;

/// Output resolution in degrees, roughly one Sentinel-2 pixel
const RESOLUTION_DEG: f64 = 0.0001;

const TREND_DAYS: f64 = 30.0;

const EVALSCRIPT: &str = r#"//VERSION=3
function setup() {
  return {
    input: [{ bands: ["B02", "B04", "B05", "B08", "B11", "SCL", "dataMask"] }],
    output: [
      { id: "ndvi", bands: 1, sampleType: "FLOAT32" },
      { id: "ndre", bands: 1, sampleType: "FLOAT32" },
      { id: "bsi", bands: 1, sampleType: "FLOAT32" },
      { id: "dataMask", bands: 1 }
    ]
  };
}
function isCloud(scl) {
  return scl === 3 || scl === 8 || scl === 9 || scl === 10;
}
function evaluatePixel(s) {
  var ndvi = (s.B08 - s.B04) / (s.B08 + s.B04);
  var ndre = (s.B08 - s.B05) / (s.B08 + s.B05);
  var bsi = ((s.B11 + s.B04) - (s.B08 + s.B02)) / ((s.B11 + s.B04) + (s.B08 + s.B02));
  var clear = isCloud(s.SCL) ? 0 : s.dataMask;
  return { ndvi: [ndvi], ndre: [ndre], bsi: [bsi], dataMask: [clear] };
}"#;

/// Satellite statistics client
#[derive(Clone)]
pub struct SentinelHubClient {
    client: Client,
    statistics_url: String,
    token: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatisticsRequest {
    input: serde_json::Value,
    aggregation: serde_json::Value,
}

/// Either the Statistical API interval list or an already reduced summary
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StatisticsPayload {
    Intervals(StatisticalResponse),
    Wrapped { summary: StatisticsSummary },
    Summary(StatisticsSummary),
}

impl StatisticsPayload {
    /// `None` when the payload carries nothing this client understands
    fn into_summary(self) -> Option<IndexSummary> {
        match self {
            StatisticsPayload::Intervals(response) => Some(response.reduce()),
            StatisticsPayload::Wrapped { summary } | StatisticsPayload::Summary(summary) => {
                summary.has_known_field().then(|| summary.into())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatisticalResponse {
    data: Vec<IntervalStatistics>,
}

#[derive(Debug, Deserialize)]
struct IntervalStatistics {
    interval: Interval,
    #[serde(default)]
    outputs: HashMap<String, OutputStatistics>,
}

#[derive(Debug, Deserialize)]
struct Interval {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct OutputStatistics {
    #[serde(default)]
    bands: HashMap<String, BandStatistics>,
}

#[derive(Debug, Deserialize)]
struct BandStatistics {
    stats: Stats,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Stats {
    #[serde(default, deserialize_with = "lenient_f64")]
    mean: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    st_dev: Option<f64>,
    #[serde(default)]
    sample_count: u64,
    #[serde(default)]
    no_data_count: u64,
}

impl Stats {
    fn valid_samples(&self) -> u64 {
        self.sample_count.saturating_sub(self.no_data_count)
    }

    /// Mean and pixel weight, when the interval saw any clear pixel
    fn observation(&self) -> Option<(f64, f64)> {
        match (self.mean, self.valid_samples()) {
            (Some(mean), n) if n > 0 => Some((mean, n as f64)),
            _ => None,
        }
    }
}

/// Numbers pass through; `"NaN"` and other non-numbers become `None`
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).filter(|v| v.is_finite()))
}

impl IntervalStatistics {
    fn band(&self, output: &str) -> Option<&Stats> {
        self.outputs
            .get(output)
            .and_then(|o| o.bands.get("B0"))
            .map(|b| &b.stats)
    }

    fn midpoint_days(&self, origin: DateTime<Utc>) -> f64 {
        let mid = self.interval.from + (self.interval.to - self.interval.from) / 2;
        (mid - origin).num_seconds() as f64 / 86_400.0
    }
}

impl StatisticalResponse {
    fn reduce(&self) -> IndexSummary {
        let ndvi: Vec<(&IntervalStatistics, &Stats, f64, f64)> = self
            .data
            .iter()
            .filter_map(|interval| {
                let stats = interval.band("ndvi")?;
                let (mean, weight) = stats.observation()?;
                Some((interval, stats, mean, weight))
            })
            .collect();

        let ndvi_mean = weighted_mean(ndvi.iter().map(|&(_, _, mean, weight)| (mean, weight)));

        // Pooled over pixels and intervals
        let ndvi_std = ndvi_mean.map(|overall| {
            let (sum, total) = ndvi.iter().fold((0.0, 0.0), |(sum, total), &(_, stats, mean, w)| {
                let sd = stats.st_dev.unwrap_or(0.0);
                (sum + w * (sd * sd + (mean - overall).powi(2)), total + w)
            });
            (sum / total).sqrt()
        });

        let ndvi_trend_30d = ndvi
            .iter()
            .map(|(interval, ..)| interval.interval.from)
            .min()
            .and_then(|origin| {
                let points: Vec<(f64, f64)> = ndvi
                    .iter()
                    .map(|&(interval, _, mean, _)| (interval.midpoint_days(origin), mean))
                    .collect();
                slope(&points)
            })
            .map(|per_day| per_day * TREND_DAYS);

        let (samples, no_data) = self
            .data
            .iter()
            .filter_map(|interval| interval.band("ndvi"))
            .fold((0u64, 0u64), |(s, n), stats| {
                (s + stats.sample_count, n + stats.no_data_count.min(stats.sample_count))
            });
        let cloud_coverage_pct = (samples > 0).then(|| no_data as f64 / samples as f64 * 100.0);

        IndexSummary {
            ndvi_mean,
            ndvi_std: ndvi_std.filter(|v| v.is_finite()),
            ndvi_trend_30d: ndvi_trend_30d.filter(|v| v.is_finite()),
            ndre_mean: self.output_mean("ndre"),
            bare_soil_index_mean: self.output_mean("bsi"),
            valid_observation_count: ndvi.len() as u32,
            cloud_coverage_pct,
        }
    }

    fn output_mean(&self, output: &str) -> Option<f64> {
        weighted_mean(
            self.data
                .iter()
                .filter_map(|interval| interval.band(output)?.observation()),
        )
    }
}

fn weighted_mean(values: impl Iterator<Item = (f64, f64)>) -> Option<f64> {
    let (sum, total) = values.fold((0.0, 0.0), |(sum, total), (v, w)| (sum + v * w, total + w));
    (total > 0.0).then(|| sum / total).filter(|v: &f64| v.is_finite())
}

/// Least-squares slope; `None` with fewer than two distinct x values
fn slope(points: &[(f64, f64)]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
    let (cov, var) = points.iter().fold((0.0, 0.0), |(cov, var), &(x, y)| {
        (cov + (x - mean_x) * (y - mean_y), var + (x - mean_x).powi(2))
    });
    (var > 0.0).then(|| cov / var)
}

/// Pre-aggregated summary, camelCase or snake_case
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatisticsSummary {
    #[serde(default, alias = "ndvi_mean")]
    ndvi_mean: Option<f64>,
    #[serde(default, alias = "ndvi_std")]
    ndvi_std: Option<f64>,
    #[serde(default, alias = "ndvi_trend_30d")]
    ndvi_trend_30d: Option<f64>,
    #[serde(default, alias = "ndre_mean")]
    ndre_mean: Option<f64>,
    #[serde(default, alias = "bsi_mean", alias = "bare_soil_index_mean")]
    bare_soil_index_mean: Option<f64>,
    #[serde(default, alias = "valid_obs_count", alias = "valid_observation_count")]
    valid_observation_count: Option<u32>,
    #[serde(default, alias = "cloud_coverage_pct")]
    cloud_coverage_pct: Option<f64>,
}

impl StatisticsSummary {
    fn has_known_field(&self) -> bool {
        self.ndvi_mean.is_some()
            || self.ndvi_std.is_some()
            || self.ndvi_trend_30d.is_some()
            || self.ndre_mean.is_some()
            || self.bare_soil_index_mean.is_some()
            || self.valid_observation_count.is_some()
            || self.cloud_coverage_pct.is_some()
    }
}

impl From<StatisticsSummary> for IndexSummary {
    fn from(s: StatisticsSummary) -> Self {
        let finite = |v: Option<f64>| v.filter(|x| x.is_finite());
        IndexSummary {
            ndvi_mean: finite(s.ndvi_mean),
            ndvi_std: finite(s.ndvi_std),
            ndvi_trend_30d: finite(s.ndvi_trend_30d),
            ndre_mean: finite(s.ndre_mean),
            bare_soil_index_mean: finite(s.bare_soil_index_mean),
            valid_observation_count: s.valid_observation_count.unwrap_or(0),
            cloud_coverage_pct: finite(s.cloud_coverage_pct),
        }
    }
}

fn build_request(geometry: &Geometry, range: &DateRange) -> StatisticsRequest {
    let time_range = json!({
        "from": range.from.to_rfc3339(),
        "to": range.to.to_rfc3339(),
    });
    let days = (range.to - range.from).num_days().clamp(1, AGGREGATION_DAYS);

    StatisticsRequest {
        input: json!({
            "bounds": { "geometry": geometry.to_area_geometry() },
            "data": [{
                "type": "sentinel-2-l2a",
                "dataFilter": { "timeRange": time_range },
            }],
        }),
        aggregation: json!({
            "timeRange": time_range,
            "aggregationInterval": {
                "of": format!("P{}D", days),
                "lastIntervalBehavior": "SHORTEN",
            },
            "resx": RESOLUTION_DEG,
            "resy": RESOLUTION_DEG,
            "evalscript": EVALSCRIPT,
        }),
    }
}

impl SentinelHubClient {
    pub fn new(config: &SentinelHubConfig) -> AppResult<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            statistics_url: config.statistics_url.clone(),
            token: config.token.clone().filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.token.is_some()
    }

    /// Fetch interval statistics for an area and window and reduce them
    pub async fn statistics(&self, geometry: &Geometry, range: &DateRange) -> AppResult<IndexSummary> {
        let token = self
            .token
            .as_deref()
            .ok_or_else(|| AppError::Configuration("Sentinel Hub token not configured".to_string()))?;

        let response = self
            .client
            .post(&self.statistics_url)
            .bearer_auth(token)
            .json(&build_request(geometry, range))
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Sentinel Hub request failed: {}", e)))?;

        let payload: StatisticsPayload = ensure_success("Sentinel Hub", response)
            .await?
            .json()
            .await
            .map_err(|e| {
                AppError::ExternalService(format!("Sentinel Hub did not return statistics: {}", e))
            })?;

        payload.into_summary().ok_or_else(|| {
            AppError::ExternalService("Sentinel Hub returned an unrecognized statistics payload".to_string())
        })
    }
}

#[async_trait]
impl VegetationIndexSource for SentinelHubClient {
    async fn fetch_indices(&self, geometry: &Geometry, range: DateRange) -> IndexSummary {
        if !self.is_configured() {
            tracing::debug!("Skipping vegetation indices without a Sentinel Hub token");
            return IndexSummary::unavailable();
        }
        match self.statistics(geometry, &range).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!("Vegetation indices unavailable: {}", e);
                IndexSummary::unavailable()
            }
        }
    }
}
