//! Z-score outlier detection.
//!
//! Scores use the full-column mean and population standard deviation of the
//! dataset in view. A row is an outlier when any scored column exceeds the
//! threshold in absolute value.

use crate::config::validate_threshold;
use crate::error::Result;
use crate::schema::{numeric_values, require_columns};
use crate::types::{AnalysisWarning, ColumnZScores, OutlierReport};
use crate::utils::{mean, present, std_dev};
use polars::prelude::*;
use tracing::debug;

const COMPONENT: &str = "z-score outliers";

/// Compute z-scores for one column, aligned to the original rows.
///
/// Missing values score `None`. A column with zero variance (or no values)
/// scores `None` everywhere, so it can never flag a row.
pub fn column_zscores(column: &str, values: &[Option<f64>]) -> ColumnZScores {
    let observed = present(values);
    let mean = mean(&observed);
    let std = std_dev(&observed, 0);
    let defined = std.is_finite() && std > 0.0;

    let scores = values
        .iter()
        .map(|v| match v {
            Some(val) if defined => Some((val - mean) / std),
            _ => None,
        })
        .collect();

    ColumnZScores {
        column: column.to_string(),
        mean,
        std,
        scores,
    }
}

/// Flag rows whose absolute z-score exceeds `threshold` on any of `columns`.
///
/// Returns the full flag vector, the flagged row positions, and the flagged
/// rows as a new DataFrame in original order.
pub fn detect_outliers(df: &DataFrame, columns: &[&str], threshold: f64) -> Result<OutlierReport> {
    validate_threshold(threshold)?;
    require_columns(df, columns)?;

    let mut warnings = Vec::new();
    let mut z_scores = Vec::with_capacity(columns.len());
    for &name in columns {
        let values = numeric_values(df, name)?;
        let scored = column_zscores(name, &values);
        if scored.scores.iter().all(Option::is_none) && df.height() > 0 {
            debug!("Column '{}' contributes no z-scores", name);
        }
        z_scores.push(scored);
    }

    if df.height() == 0 {
        warnings.push(AnalysisWarning::empty_input(COMPONENT, "dataset has no rows"));
    }

    let flags: Vec<bool> = (0..df.height())
        .map(|row| {
            z_scores.iter().any(|col| {
                col.scores[row].is_some_and(|z| z.abs() > threshold)
            })
        })
        .collect();

    let outlier_rows: Vec<usize> = flags
        .iter()
        .enumerate()
        .filter_map(|(row, flagged)| flagged.then_some(row))
        .collect();

    let mask = BooleanChunked::from_slice("mask".into(), &flags);
    let outliers = df.filter(&mask)?;

    debug!(
        "Flagged {} of {} rows at |z| > {}",
        outlier_rows.len(),
        df.height(),
        threshold
    );

    Ok(OutlierReport {
        threshold,
        columns: columns.iter().map(|c| c.to_string()).collect(),
        flags,
        outlier_rows,
        outliers,
        z_scores,
        warnings,
    })
}
