//! Equal-width histograms, one per column.

use crate::config::validate_bins;
use crate::error::Result;
use crate::schema::{numeric_values, require_columns};
use crate::types::{AnalysisWarning, Histogram, HistogramSet};
use crate::utils::present;
use polars::prelude::*;
use tracing::debug;

const COMPONENT: &str = "histogram";

/// Bucket each of `columns` into `bins` equal-width bins over that column's
/// own observed range.
pub fn histograms(df: &DataFrame, columns: &[&str], bins: usize) -> Result<HistogramSet> {
    validate_bins("bins", bins)?;
    require_columns(df, columns)?;

    let mut warnings = Vec::new();
    let mut histograms = Vec::with_capacity(columns.len());
    for &name in columns {
        let values = numeric_values(df, name)?;
        let histogram = histogram(name, &values, bins);
        if histogram.total == 0 {
            warnings.push(AnalysisWarning::empty_input(
                COMPONENT,
                format!("column '{}' has no values", name),
            ));
        }
        histograms.push(histogram);
    }

    Ok(HistogramSet {
        histograms,
        warnings,
    })
}

/// Histogram of a single column.
///
/// The last bin is closed on the right so the maximum is counted. A
/// constant column yields one bin `[v, v]` holding every value.
pub fn histogram(column: &str, values: &[Option<f64>], bins: usize) -> Histogram {
    let observed = present(values);
    let excluded = values.len() - observed.len();

    let bounds = observed
        .iter()
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        });

    let (edges, counts) = match bounds {
        None => (Vec::new(), Vec::new()),
        Some((min, max)) if min == max => (vec![min, max], vec![observed.len()]),
        Some((min, max)) => {
            let edges = equal_width_edges(min, max, bins);
            let mut counts = vec![0usize; bins];
            for &value in &observed {
                counts[bin_index(&edges, value)] += 1;
            }
            (edges, counts)
        }
    };

    debug!(
        "Histogram for '{}': {} values, {} missing",
        column,
        observed.len(),
        excluded
    );

    Histogram {
        column: column.to_string(),
        edges,
        counts,
        total: observed.len(),
        excluded,
    }
}

/// `bins + 1` finite, non-decreasing edges from `min` to `max`.
///
/// Interpolates instead of accumulating `(max - min) / bins`, which
/// overflows when the range exceeds `f64::MAX`.
fn equal_width_edges(min: f64, max: f64, bins: usize) -> Vec<f64> {
    let mut edges = Vec::with_capacity(bins + 1);
    edges.push(min);
    for i in 1..bins {
        let t = i as f64 / bins as f64;
        let edge = (min * (1.0 - t) + max * t).clamp(min, max);
        let previous = edges[i - 1];
        edges.push(edge.max(previous));
    }
    edges.push(max);
    edges
}

fn bin_index(edges: &[f64], value: f64) -> usize {
    let bins = edges.len() - 1;
    let (min, max) = (edges[0], edges[bins]);
    let n = bins as f64;
    let fraction = (value / n - min / n) / (max / n - min / n);
    let mut index = ((fraction * n) as usize).min(bins - 1);
    // Correct for rounding so the edge comparison is authoritative.
    if index > 0 && value < edges[index] {
        index -= 1;
    } else if index + 1 < bins && value >= edges[index + 1] {
        index += 1;
    }
    index
}
