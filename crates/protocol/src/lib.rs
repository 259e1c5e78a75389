mod types;

pub use types::{AggregationRecord, Granularity, ParseGranularityError, GRANULARITIES};
