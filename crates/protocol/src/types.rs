//! Types mirroring the JSON the metering endpoint returns.
//!
//! The endpoint is keyed by aggregation granularity
//! (`GET /smart-plug/{granularity}`) and responds with an ordered array
//! of pre-aggregated buckets. Field names on the wire are camelCase.

use serde::{Deserialize, Serialize};

/// Aggregation bucket size selectable for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Minute,
    #[default]
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Annual,
}

/// All granularities in selector order.
pub const GRANULARITIES: [Granularity; 6] = [
    Granularity::Minute,
    Granularity::Hourly,
    Granularity::Daily,
    Granularity::Weekly,
    Granularity::Monthly,
    Granularity::Annual,
];

impl Granularity {
    /// The path segment used by the metering endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Minute => "minute",
            Granularity::Hourly => "hourly",
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
            Granularity::Annual => "annual",
        }
    }

    /// Capitalized label for titles and tabs.
    pub fn label(self) -> &'static str {
        match self {
            Granularity::Minute => "Minute",
            Granularity::Hourly => "Hourly",
            Granularity::Daily => "Daily",
            Granularity::Weekly => "Weekly",
            Granularity::Monthly => "Monthly",
            Granularity::Annual => "Yearly",
        }
    }

    /// Returns the next granularity in selector order, wrapping around.
    pub fn next(self) -> Self {
        match self {
            Granularity::Minute => Granularity::Hourly,
            Granularity::Hourly => Granularity::Daily,
            Granularity::Daily => Granularity::Weekly,
            Granularity::Weekly => Granularity::Monthly,
            Granularity::Monthly => Granularity::Annual,
            Granularity::Annual => Granularity::Minute,
        }
    }

    /// Returns the previous granularity in selector order, wrapping around.
    pub fn prev(self) -> Self {
        match self {
            Granularity::Minute => Granularity::Annual,
            Granularity::Hourly => Granularity::Minute,
            Granularity::Daily => Granularity::Hourly,
            Granularity::Weekly => Granularity::Daily,
            Granularity::Monthly => Granularity::Weekly,
            Granularity::Annual => Granularity::Monthly,
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unrecognized granularity strings. Kept dependency-free so
/// the protocol crate stays serde-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseGranularityError(pub String);

impl std::fmt::Display for ParseGranularityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown granularity '{}'", self.0)
    }
}

impl std::error::Error for ParseGranularityError {}

impl std::str::FromStr for Granularity {
    type Err = ParseGranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "minute" => Ok(Granularity::Minute),
            "hourly" => Ok(Granularity::Hourly),
            "daily" => Ok(Granularity::Daily),
            "weekly" => Ok(Granularity::Weekly),
            "monthly" => Ok(Granularity::Monthly),
            "annual" | "yearly" => Ok(Granularity::Annual),
            other => Err(ParseGranularityError(other.to_string())),
        }
    }
}

/// One pre-aggregated metering bucket as returned by the endpoint.
///
/// `period` is the bucket's raw epoch-millisecond timestamp; everything
/// else is the source's aggregate over that bucket. The source is
/// expected to keep `min_watts <= average_watts <= max_watts`; this
/// crate does not enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationRecord {
    pub period: i64,
    pub average_volt: f64,
    pub average_current: f64,
    pub average_watts: f64,
    pub max_watts: f64,
    pub min_watts: f64,
    pub total_count: u64,
    pub total_watt_hours: f64,
}
