//! Bubble chart projection.
//!
//! This is a row filter plus a linear size transform; nothing is binned.

use crate::config::validate_scale;
use crate::error::Result;
use crate::schema::{BubbleColumns, numeric_values, require_columns};
use crate::types::{AnalysisWarning, BubbleChart, BubblePoint};
use polars::prelude::*;
use tracing::debug;

const COMPONENT: &str = "bubble chart";

/// Project `(x, y, size * scale, color)` for every row where all four
/// columns are present, in original row order.
pub fn bubble_chart(df: &DataFrame, columns: BubbleColumns<'_>, scale: f64) -> Result<BubbleChart> {
    validate_scale(scale)?;
    require_columns(df, &[columns.x, columns.y, columns.size, columns.color])?;

    let xs = numeric_values(df, columns.x)?;
    let ys = numeric_values(df, columns.y)?;
    let sizes = numeric_values(df, columns.size)?;
    let colors = numeric_values(df, columns.color)?;

    let points: Vec<BubblePoint> = (0..df.height())
        .filter_map(|row| {
            Some(BubblePoint {
                row,
                x: xs[row]?,
                y: ys[row]?,
                size: sizes[row]? * scale,
                color: colors[row]?,
            })
        })
        .collect();

    let excluded = df.height() - points.len();
    let mut warnings = Vec::new();
    if points.is_empty() {
        warnings.push(AnalysisWarning::empty_input(
            COMPONENT,
            "no rows with all four values present",
        ));
    }

    debug!(
        "Projected {} bubbles, {} rows excluded",
        points.len(),
        excluded
    );

    Ok(BubbleChart {
        x_column: columns.x.to_string(),
        y_column: columns.y.to_string(),
        size_column: columns.size.to_string(),
        color_column: columns.color.to_string(),
        scale,
        points,
        excluded,
        warnings,
    })
}
