//! Time-indexed projection of selected columns.

use crate::error::Result;
use crate::schema::{numeric_values, require_columns, timestamp_values};
use crate::types::{AnalysisWarning, TimeSeries, TimeSeriesPoint};
use polars::prelude::*;
use tracing::debug;

const COMPONENT: &str = "time series";

/// Pair each row's timestamp with the values of `columns`.
///
/// Rows without a usable timestamp are dropped and counted; individual
/// missing values stay `None` and keep their row.
pub fn time_series(df: &DataFrame, columns: &[&str]) -> Result<TimeSeries> {
    require_columns(df, columns)?;
    let timestamps = timestamp_values(df)?;
    let series_values = columns
        .iter()
        .map(|name| numeric_values(df, name))
        .collect::<Result<Vec<_>>>()?;

    let points: Vec<TimeSeriesPoint> = timestamps
        .iter()
        .enumerate()
        .filter_map(|(row, timestamp)| {
            timestamp.map(|timestamp| TimeSeriesPoint {
                row,
                timestamp,
                values: series_values.iter().map(|values| values[row]).collect(),
            })
        })
        .collect();

    let missing_timestamps = timestamps.len() - points.len();
    let mut warnings = Vec::new();
    if points.is_empty() {
        warnings.push(AnalysisWarning::empty_input(
            COMPONENT,
            "no rows with a usable timestamp",
        ));
    }

    debug!(
        "Projected {} time-series points for {:?}",
        points.len(),
        columns
    );

    Ok(TimeSeries {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        points,
        missing_timestamps,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CLEANING_COLUMNS;

    #[test]
    fn test_time_series_keeps_row_order_and_gaps() {
        let df = df![
            "Timestamp" => [Some("2021-08-09 00:01"), None, Some("2021-08-09 00:03")],
            "ModA" => [Some(1.0), Some(2.0), None],
            "ModB" => [Some(1.5), Some(2.5), Some(3.5)],
        ]
        .unwrap();

        let ts = time_series(&df, CLEANING_COLUMNS).unwrap();
        assert_eq!(ts.points.len(), 2);
        assert_eq!(ts.missing_timestamps, 1);
        assert_eq!(ts.points[0].row, 0);
        assert_eq!(ts.points[1].row, 2);
        assert_eq!(ts.points[1].values, vec![None, Some(3.5)]);
        assert!(ts.points[0].timestamp < ts.points[1].timestamp);
    }

    #[test]
    fn test_time_series_requires_timestamp() {
        let df = df!["ModA" => [1.0], "ModB" => [2.0]].unwrap();
        let err = time_series(&df, CLEANING_COLUMNS).unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_time_series_unparseable_timestamps_warn() {
        let df = df![
            "Timestamp" => ["soon", "later"],
            "ModA" => [1.0, 2.0],
        ]
        .unwrap();
        let ts = time_series(&df, &["ModA"]).unwrap();
        assert!(ts.points.is_empty());
        assert_eq!(ts.missing_timestamps, 2);
        assert_eq!(ts.warnings.len(), 1);
    }
}
