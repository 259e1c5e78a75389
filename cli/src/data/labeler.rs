//! Period label formatting.
//!
//! Each aggregation bucket carries a raw epoch-millisecond timestamp;
//! the label shown in the table and on the chart axis depends on the
//! selected granularity. Labels are display-only and never parsed back.
//!
//! Timestamps are formatted in UTC so the same input always produces
//! the same label regardless of the host timezone.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use plugwatch_protocol::Granularity;

/// One week in milliseconds, the divisor for the weekly bucket index.
const WEEK_MS: i64 = 604_800_000;

/// Formats a bucket timestamp for display under the given granularity.
///
/// Total: an out-of-range timestamp degrades to the raw millisecond
/// value rather than failing.
pub fn label(timestamp_ms: i64, granularity: Granularity) -> String {
    let Some(date) = DateTime::from_timestamp_millis(timestamp_ms) else {
        return format!("@{}", timestamp_ms);
    };

    match granularity {
        Granularity::Minute => date.format("%-d %b %y, %H:%M").to_string(),
        Granularity::Hourly => date.format("%-d %b %y, %H").to_string(),
        Granularity::Weekly => format!(
            "{} (Week {})",
            date.format("%-d %b %y"),
            week_index(timestamp_ms, &date)
        ),
        Granularity::Monthly => date.format("%b %y").to_string(),
        Granularity::Annual => date.format("%Y").to_string(),
        Granularity::Daily => date.format("%-d %b %y").to_string(),
    }
}

/// Week index within the timestamp's own year:
/// `ceil((t - start_of_year) / one_week)`.
///
/// This is deliberately not ISO-8601: the count starts at 0 for the
/// first instant of the year and is not clamped, so values above 52
/// occur near year end. The metering source has always labeled weeks
/// this way and the labels must stay comparable across releases.
fn week_index(timestamp_ms: i64, date: &DateTime<Utc>) -> i64 {
    let start_of_year = Utc
        .with_ymd_and_hms(date.year(), 1, 1, 0, 0, 0)
        .unwrap()
        .timestamp_millis();
    (timestamp_ms - start_of_year).div_ceil(WEEK_MS)
}
