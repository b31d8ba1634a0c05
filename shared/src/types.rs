//! Common types used across the pipeline

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A point in GeoJSON axis order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub lon: f64,
    pub lat: f64,
}

/// Observation window for satellite indices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    /// Window of `days` ending at `now`
    pub fn lookback(now: DateTime<Utc>, days: i64) -> Self {
        Self {
            from: now - Duration::days(days),
            to: now,
        }
    }

    /// Fill unspecified ends: `to` defaults to now, `from` to `days` before `to`
    pub fn resolve(
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        days: i64,
    ) -> Self {
        let to = to.unwrap_or(now);
        match from {
            Some(from) => Self { from, to },
            None => Self::lookback(to, days),
        }
    }

    pub fn is_ordered(&self) -> bool {
        self.from < self.to
    }
}
