//! Projection of raw aggregation records into displayable form.
//!
//! A fetch returns an ordered sequence of buckets; this module derives
//! everything the view needs from it: labeled table rows, the chart
//! series, the running watt-hour total, and the chart mode. The whole
//! projection is rebuilt from scratch on every applied fetch, never
//! merged with the previous one.

use serde::Serialize;

use plugwatch_protocol::{AggregationRecord, Granularity};

use super::labeler;

/// How the chart renders the watt-hour series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartMode {
    /// Continuous line, used for minute buckets.
    Line,
    /// Discrete bars, used for every coarser granularity.
    Bar,
}

impl ChartMode {
    /// Presentation hint: minute data is dense enough to read as a
    /// curve, everything coarser reads better as bars.
    pub fn for_granularity(granularity: Granularity) -> Self {
        match granularity {
            Granularity::Minute => ChartMode::Line,
            _ => ChartMode::Bar,
        }
    }
}

/// One table row: the raw record plus its position and period label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    /// 0-based position in the fetched sequence, in server order.
    pub index: usize,
    pub period_label: String,
    #[serde(flatten)]
    pub record: AggregationRecord,
}

impl DisplayRow {
    // Float columns render with two decimals, matching the endpoint's
    // own dashboards.
    pub fn average_volt_cell(&self) -> String {
        format!("{:.2}", self.record.average_volt)
    }

    pub fn average_current_cell(&self) -> String {
        format!("{:.2}", self.record.average_current)
    }

    pub fn average_watts_cell(&self) -> String {
        format!("{:.2}", self.record.average_watts)
    }

    pub fn max_watts_cell(&self) -> String {
        format!("{:.2}", self.record.max_watts)
    }

    pub fn min_watts_cell(&self) -> String {
        format!("{:.2}", self.record.min_watts)
    }

    pub fn total_watt_hours_cell(&self) -> String {
        format!("{:.2}", self.record.total_watt_hours)
    }
}

/// Parallel label/value arrays for the chart, in row order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub watt_hours: Vec<f64>,
}

/// Everything derived from one applied fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub granularity: Granularity,
    pub rows: Vec<DisplayRow>,
    pub chart: ChartSeries,
    pub running_total: f64,
    pub mode: ChartMode,
}

impl Projection {
    /// The projection shown before the first fetch settles.
    pub fn empty(granularity: Granularity) -> Self {
        Self {
            granularity,
            rows: Vec::new(),
            chart: ChartSeries::default(),
            running_total: 0.0,
            mode: ChartMode::for_granularity(granularity),
        }
    }
}

/// Projects a fetched record sequence for display.
///
/// Rows keep the server's order and are never re-sorted here; the
/// running total is a plain in-order sum so it is reproducible for a
/// given input sequence. Chart values are rounded to two decimals for
/// display while the total is summed from the unrounded inputs.
pub fn project(records: Vec<AggregationRecord>, granularity: Granularity) -> Projection {
    let mut labels = Vec::with_capacity(records.len());
    let mut watt_hours = Vec::with_capacity(records.len());
    let mut running_total = 0.0;

    let rows: Vec<DisplayRow> = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let period_label = labeler::label(record.period, granularity);
            labels.push(period_label.clone());
            watt_hours.push(round2(record.total_watt_hours));
            running_total += record.total_watt_hours;
            DisplayRow {
                index,
                period_label,
                record,
            }
        })
        .collect();

    Projection {
        granularity,
        rows,
        chart: ChartSeries { labels, watt_hours },
        running_total,
        mode: ChartMode::for_granularity(granularity),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(period: i64, watt_hours: f64) -> AggregationRecord {
        AggregationRecord {
            period,
            average_volt: 230.0,
            average_current: 1.0,
            average_watts: 230.0,
            max_watts: 240.0,
            min_watts: 220.0,
            total_count: 60,
            total_watt_hours: watt_hours,
        }
    }

    #[test]
    fn rows_keep_server_order_and_zero_based_indexes() {
        // Deliberately non-chronological input: order must be preserved.
        let records = vec![
            record(1_700_000_060_000, 1.0),
            record(1_700_000_000_000, 2.0),
            record(1_700_000_120_000, 3.0),
        ];

        let projection = project(records, Granularity::Minute);

        assert_eq!(projection.rows.len(), 3);
        for (i, row) in projection.rows.iter().enumerate() {
            assert_eq!(row.index, i);
        }
        assert_eq!(projection.rows[0].record.period, 1_700_000_060_000);
        assert_eq!(projection.rows[1].record.period, 1_700_000_000_000);
    }

    #[test]
    fn running_total_is_in_order_sum_of_watt_hours() {
        let records = vec![record(0, 1.25), record(1, 2.5), record(2, 0.1)];
        let projection = project(records, Granularity::Hourly);
        assert_eq!(projection.running_total, 1.25 + 2.5 + 0.1);
    }

    #[test]
    fn chart_series_parallels_rows() {
        let records = vec![record(1_700_000_000_000, 3.834), record(1_700_003_600_000, 2.0)];
        let projection = project(records, Granularity::Hourly);

        assert_eq!(projection.chart.labels.len(), 2);
        assert_eq!(projection.chart.watt_hours.len(), 2);
        assert_eq!(projection.chart.labels[0], projection.rows[0].period_label);
        // Chart values carry two decimals only.
        assert_eq!(projection.chart.watt_hours[0], 3.83);
    }

    #[test]
    fn chart_mode_is_line_for_minute_and_bar_otherwise() {
        assert_eq!(
            ChartMode::for_granularity(Granularity::Minute),
            ChartMode::Line
        );
        for g in plugwatch_protocol::GRANULARITIES {
            if g != Granularity::Minute {
                assert_eq!(ChartMode::for_granularity(g), ChartMode::Bar);
            }
        }
    }

    #[test]
    fn minute_scenario_projects_expected_row() {
        let records = vec![AggregationRecord {
            period: 1_700_000_000_000,
            average_volt: 230.0,
            average_current: 1.0,
            average_watts: 230.0,
            max_watts: 240.0,
            min_watts: 220.0,
            total_count: 60,
            total_watt_hours: 3.83,
        }];

        let projection = project(records, Granularity::Minute);
        let row = &projection.rows[0];

        assert_eq!(row.index, 0);
        assert_eq!(row.period_label, "14 Nov 23, 22:13");
        assert_eq!(row.average_watts_cell(), "230.00");
        assert_eq!(row.total_watt_hours_cell(), "3.83");
        assert_eq!(projection.mode, ChartMode::Line);
    }

    #[test]
    fn empty_sequence_projects_to_empty_everything() {
        let projection = project(Vec::new(), Granularity::Weekly);

        assert!(projection.rows.is_empty());
        assert!(projection.chart.labels.is_empty());
        assert!(projection.chart.watt_hours.is_empty());
        assert_eq!(projection.running_total, 0.0);
        assert_eq!(projection.mode, ChartMode::Bar);
    }

    #[test]
    fn identical_input_projects_identical_output() {
        let records = vec![record(1_700_000_000_000, 3.83), record(1_700_000_060_000, 4.1)];
        let first = project(records.clone(), Granularity::Minute);
        let second = project(records, Granularity::Minute);
        assert_eq!(first, second);
    }
}
