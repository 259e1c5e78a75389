//! HTTP client for the smart-plug metering endpoint.

use plugwatch_protocol::{AggregationRecord, Granularity};
use tracing::debug;

/// Failure modes of a single fetch round trip.
///
/// Fetches are never retried here; the polling cadence is the retry
/// mechanism, so every failure is reported to the caller as-is.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("bad response: {0}")]
    BadResponse(String),
}

/// A source of aggregation records keyed by granularity.
///
/// The production implementation is [`HttpMeterClient`]; tests drive
/// the polling engine with in-memory fakes.
pub trait MeterSource: Send + Sync {
    fn fetch(&self, granularity: Granularity) -> Result<Vec<AggregationRecord>, FetchError>;
}

/// Fetches bucketed metering samples over HTTP.
///
/// One `GET {base}/smart-plug/{granularity}` per call, returning the
/// response array in server order. No explicit timeout: a hung request
/// delays that polling cycle and nothing else.
pub struct HttpMeterClient {
    base_url: String,
}

impl HttpMeterClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    fn url_for(&self, granularity: Granularity) -> String {
        format!("{}/smart-plug/{}", self.base_url, granularity.as_str())
    }
}

impl MeterSource for HttpMeterClient {
    fn fetch(&self, granularity: Granularity) -> Result<Vec<AggregationRecord>, FetchError> {
        let url = self.url_for(granularity);
        debug!(%url, "Fetching aggregation records");

        let mut response = ureq::get(&url)
            .header("accept", "application/json")
            .call()
            .map_err(|e| match e {
                ureq::Error::StatusCode(code) => FetchError::BadResponse(format!("HTTP {}", code)),
                other => FetchError::Network(other.to_string()),
            })?;

        let records: Vec<AggregationRecord> = response
            .body_mut()
            .read_json()
            .map_err(|e| FetchError::BadResponse(format!("malformed payload: {}", e)))?;

        debug!(count = records.len(), %granularity, "Fetch completed");
        Ok(records)
    }
}
