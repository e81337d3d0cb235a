//! Pairwise-complete Pearson correlation.

use crate::error::Result;
use crate::schema::{numeric_values, require_columns};
use crate::types::{AnalysisWarning, CorrelationMatrix};
use anofox_statistics::correlation::pearson;
use polars::prelude::*;
use tracing::debug;

const COMPONENT: &str = "correlation";

/// Compute the Pearson correlation matrix over `columns`, in that order.
///
/// Each pair uses only the rows where both columns are present. Pairs with
/// fewer than three shared rows or zero variance on either side are `NaN`.
/// The diagonal is 1.0 for columns with non-zero variance and `NaN`
/// otherwise.
pub fn correlation_matrix(df: &DataFrame, columns: &[&str]) -> Result<CorrelationMatrix> {
    require_columns(df, columns)?;

    let series_values = columns
        .iter()
        .map(|name| numeric_values(df, name))
        .collect::<Result<Vec<_>>>()?;

    let size = columns.len();
    let mut values = vec![vec![f64::NAN; size]; size];
    let mut p_values = vec![vec![f64::NAN; size]; size];
    let mut pair_counts = vec![vec![0usize; size]; size];
    let mut warnings = Vec::new();

    for i in 0..size {
        for j in i..size {
            let (x, y) = paired(&series_values[i], &series_values[j]);
            pair_counts[i][j] = x.len();
            pair_counts[j][i] = x.len();

            let (estimate, p_value) = if i == j {
                if has_variance(&x) { (1.0, 0.0) } else { (f64::NAN, f64::NAN) }
            } else {
                pair_estimate(&x, &y)
            };
            values[i][j] = estimate;
            values[j][i] = estimate;
            p_values[i][j] = p_value;
            p_values[j][i] = p_value;
        }

        if pair_counts[i][i] == 0 {
            warnings.push(AnalysisWarning::empty_input(
                COMPONENT,
                format!("column '{}' has no values", columns[i]),
            ));
        }
    }

    debug!("Computed {}x{} correlation matrix", size, size);

    Ok(CorrelationMatrix {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        values,
        p_values,
        pair_counts,
        warnings,
    })
}

/// Rows where both series are present.
fn paired(a: &[Option<f64>], b: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    a.iter()
        .zip(b.iter())
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => Some((*x, *y)),
            _ => None,
        })
        .unzip()
}

fn has_variance(values: &[f64]) -> bool {
    values.len() >= 2 && values.iter().any(|v| *v != values[0])
}

/// Coefficient and two-sided p-value for one pair, `NaN` when undefined.
fn pair_estimate(x: &[f64], y: &[f64]) -> (f64, f64) {
    match pearson(x, y, None) {
        Ok(result) => (result.estimate, result.p_value),
        Err(_) => (f64::NAN, f64::NAN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CORRELATION_COLUMNS;

    // ==================== pair_estimate tests ====================

    #[test]
    fn test_pair_estimate_perfect_positive_and_negative() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let (r, p) = pair_estimate(&x, &[2.0, 4.0, 6.0, 8.0]);
        assert!((r - 1.0).abs() < 1e-12);
        assert!(p < 1e-6);
        let (r, _) = pair_estimate(&x, &[8.0, 6.0, 4.0, 2.0]);
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pair_estimate_undefined_is_nan() {
        let (r, p) = pair_estimate(&[1.0, 2.0, 3.0], &[5.0, 5.0, 5.0]);
        assert!(r.is_nan() && p.is_nan());
        // Fewer than three shared rows
        assert!(pair_estimate(&[1.0, 2.0], &[3.0, 5.0]).0.is_nan());
        assert!(pair_estimate(&[], &[]).0.is_nan());
    }

    #[test]
    fn test_pair_estimate_p_value_in_unit_range() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let (r, p) = pair_estimate(&x, &[2.0, 4.0, 5.0, 4.0, 5.0]);
        assert!(r > 0.0 && r < 1.0);
        assert!(p > 0.0 && p < 1.0);
    }

    // ==================== correlation_matrix tests ====================

    #[test]
    fn test_matrix_symmetric_with_unit_diagonal() {
        let df = df![
            "a" => [1.0, 2.0, 3.0, 4.0, 5.0],
            "b" => [2.0, 1.0, 4.0, 3.0, 6.0],
            "c" => [9.0, 7.0, 5.0, 3.0, 1.0],
        ]
        .unwrap();

        let matrix = correlation_matrix(&df, &["a", "b", "c"]).unwrap();
        assert_eq!(matrix.size(), 3);
        for i in 0..3 {
            assert_eq!(matrix.values[i][i], 1.0);
            for j in 0..3 {
                assert_eq!(matrix.values[i][j].to_bits(), matrix.values[j][i].to_bits());
            }
        }
        assert!((matrix.get("a", "c").unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_matrix_uses_pairwise_complete_rows() {
        let df = df![
            "a" => [Some(1.0), Some(2.0), Some(3.0), None],
            "b" => [Some(2.0), Some(4.0), Some(6.0), Some(100.0)],
            "c" => [None, Some(1.0), Some(2.0), Some(3.0)],
        ]
        .unwrap();

        let matrix = correlation_matrix(&df, &["a", "b", "c"]).unwrap();
        // The row where `a` is missing must not affect (a, b).
        assert!((matrix.get("a", "b").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(matrix.pair_counts[0][1], 3);
        assert_eq!(matrix.pair_counts[1][2], 3);
        assert_eq!(matrix.pair_counts[0][2], 2);
        assert_eq!(matrix.pair_counts[1][1], 4);
        assert!(matrix.get("a", "c").unwrap().is_nan());
    }

    #[test]
    fn test_matrix_constant_column_is_undefined() {
        let df = df![
            "a" => [1.0, 2.0, 3.0],
            "flat" => [4.0, 4.0, 4.0],
        ]
        .unwrap();

        let matrix = correlation_matrix(&df, &["a", "flat"]).unwrap();
        assert_eq!(matrix.values[0][0], 1.0);
        assert!(matrix.values[1][1].is_nan());
        assert!(matrix.values[0][1].is_nan());
        assert!(matrix.values[1][0].is_nan());
    }

    #[test]
    fn test_matrix_missing_column_is_schema_error() {
        let df = df!["GHI" => [1.0, 2.0]].unwrap();
        let err = correlation_matrix(&df, CORRELATION_COLUMNS).unwrap_err();
        assert!(err.is_schema_error());
        assert_eq!(err.error_code(), "MISSING_COLUMN");
    }

    #[test]
    fn test_matrix_on_empty_frame_is_all_nan() {
        let df = df![
            "a" => Vec::<f64>::new(),
            "b" => Vec::<f64>::new(),
        ]
        .unwrap();

        let matrix = correlation_matrix(&df, &["a", "b"]).unwrap();
        assert!(matrix.values.iter().flatten().all(|v| v.is_nan()));
        assert_eq!(matrix.warnings.len(), 2);
    }
}
