//! Summary statistics for every numeric column.

use crate::error::Result;
use crate::schema::{numeric_column_names, numeric_values};
use crate::types::{AnalysisWarning, ColumnSummary, DescriptiveStatistics};
use crate::utils::{mean, present, quantile_sorted, sorted, std_dev};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

const COMPONENT: &str = "descriptive statistics";

/// Compute count, mean, sample std, min, quartiles and max for every
/// numeric column, plus a separate column-to-median mapping.
///
/// An empty dataset yields an empty result with an
/// [`AnalysisWarning::EmptyInput`] rather than an error.
pub fn describe(df: &DataFrame) -> Result<DescriptiveStatistics> {
    let mut warnings = Vec::new();

    if df.height() == 0 {
        warnings.push(AnalysisWarning::empty_input(COMPONENT, "dataset has no rows"));
        return Ok(DescriptiveStatistics {
            rows: 0,
            columns: Vec::new(),
            medians: BTreeMap::new(),
            warnings,
        });
    }

    let mut columns = Vec::new();
    let mut medians = BTreeMap::new();

    for name in numeric_column_names(df) {
        let values = present(&numeric_values(df, &name)?);
        if values.is_empty() {
            warnings.push(AnalysisWarning::empty_input(
                COMPONENT,
                format!("column '{}' has no values", name),
            ));
        }

        let summary = summarize(&name, &values);
        medians.insert(name, summary.q50);
        columns.push(summary);
    }

    debug!(
        "Described {} numeric columns over {} rows",
        columns.len(),
        df.height()
    );

    Ok(DescriptiveStatistics {
        rows: df.height(),
        columns,
        medians,
        warnings,
    })
}

/// Summarize the present values of one column.
pub fn summarize(column: &str, values: &[f64]) -> ColumnSummary {
    let ordered = sorted(values);
    ColumnSummary {
        column: column.to_string(),
        count: values.len(),
        mean: mean(values),
        std: std_dev(values, 1),
        min: ordered.first().copied().unwrap_or(f64::NAN),
        q25: quantile_sorted(&ordered, 0.25),
        q50: quantile_sorted(&ordered, 0.5),
        q75: quantile_sorted(&ordered, 0.75),
        max: ordered.last().copied().unwrap_or(f64::NAN),
    }
}
