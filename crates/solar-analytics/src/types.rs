use crate::config::Normalization;
use chrono::NaiveDateTime;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

// ============================================================================
// Warnings
// ============================================================================

/// Non-fatal conditions attached to a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisWarning {
    /// The dataset or a column subset has no usable rows after exclusions.
    EmptyInput { component: String, detail: String },
}

impl AnalysisWarning {
    /// Build and log an empty-input warning.
    pub(crate) fn empty_input(component: &str, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        warn!("{}: empty input ({})", component, detail);
        Self::EmptyInput {
            component: component.to_string(),
            detail,
        }
    }
}

// ============================================================================
// Descriptive statistics
// ============================================================================

/// `describe()`-style summary of one numeric column.
///
/// Undefined statistics are `NaN` (serialized as `null`).
#[derive(Debug, Clone, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (ddof = 1)
    pub std: f64,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub q50: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DescriptiveStatistics {
    pub rows: usize,
    pub columns: Vec<ColumnSummary>,
    /// Median per column, reported separately from the quartiles.
    pub medians: BTreeMap<String, f64>,
    pub warnings: Vec<AnalysisWarning>,
}

impl DescriptiveStatistics {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSummary> {
        self.columns.iter().find(|summary| summary.column == name)
    }

    pub fn median(&self, name: &str) -> Option<f64> {
        self.medians.get(name).copied()
    }
}

// ============================================================================
// Correlation
// ============================================================================

/// Square Pearson correlation matrix, rows and columns in `columns` order.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
    /// Two-sided p-values for zero correlation, `NaN` where undefined.
    pub p_values: Vec<Vec<f64>>,
    /// Number of rows where both columns were present.
    pub pair_counts: Vec<Vec<usize>>,
    pub warnings: Vec<AnalysisWarning>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.columns.len()
    }

    /// Coefficient for a pair of column names.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }
}

// ============================================================================
// Outliers
// ============================================================================

/// Per-row z-scores for one column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnZScores {
    pub column: String,
    pub mean: f64,
    /// Population standard deviation (ddof = 0)
    pub std: f64,
    /// Aligned to the original rows; `None` where the value is missing or
    /// the column has zero variance.
    pub scores: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutlierReport {
    pub threshold: f64,
    pub columns: Vec<String>,
    /// One flag per original row.
    pub flags: Vec<bool>,
    /// Positions of flagged rows, ascending.
    pub outlier_rows: Vec<usize>,
    /// The flagged rows themselves, in original order.
    #[serde(skip)]
    pub outliers: DataFrame,
    pub z_scores: Vec<ColumnZScores>,
    pub warnings: Vec<AnalysisWarning>,
}

impl OutlierReport {
    pub fn outlier_count(&self) -> usize {
        self.outlier_rows.len()
    }
}

// ============================================================================
// Wind rose
// ============================================================================

/// One angular sector `[start, end)` in degrees.
#[derive(Debug, Clone, Serialize)]
pub struct WindSector {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub count: usize,
    pub frequency: f64,
    /// Counts per speed bin, empty when speed sub-binning is disabled.
    pub speed_counts: Vec<usize>,
    pub speed_frequencies: Vec<f64>,
}

/// Rows left out of the wind rose, by reason. Each row counts once, under
/// the first reason that applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WindExclusions {
    pub missing_direction: usize,
    pub missing_speed: usize,
    pub negative_speed: usize,
}

impl WindExclusions {
    pub fn total(&self) -> usize {
        self.missing_direction + self.missing_speed + self.negative_speed
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WindRose {
    pub sector_width: f64,
    /// Rendered bar width in degrees (`sector_width * opening`).
    pub bar_width: f64,
    pub normalization: Normalization,
    /// Lower edges of the speed bins; the last bin is open-ended.
    pub speed_edges: Vec<f64>,
    pub sectors: Vec<WindSector>,
    /// Number of observations binned.
    pub observations: usize,
    pub excluded: WindExclusions,
    pub warnings: Vec<AnalysisWarning>,
}

impl WindRose {
    /// Sum of sector frequencies in the configured unit.
    pub fn total_frequency(&self) -> f64 {
        self.sectors.iter().map(|sector| sector.frequency).sum()
    }
}

// ============================================================================
// Histograms
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Histogram {
    pub column: String,
    /// `counts.len() + 1` edges; empty when the column has no values.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    /// Number of values binned.
    pub total: usize,
    /// Number of missing values left out.
    pub excluded: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramSet {
    pub histograms: Vec<Histogram>,
    pub warnings: Vec<AnalysisWarning>,
}

impl HistogramSet {
    pub fn get(&self, column: &str) -> Option<&Histogram> {
        self.histograms.iter().find(|h| h.column == column)
    }
}

// ============================================================================
// Bubble chart
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BubblePoint {
    pub row: usize,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BubbleChart {
    pub x_column: String,
    pub y_column: String,
    pub size_column: String,
    pub color_column: String,
    pub scale: f64,
    pub points: Vec<BubblePoint>,
    /// Rows with at least one of the four values missing.
    pub excluded: usize,
    pub warnings: Vec<AnalysisWarning>,
}

// ============================================================================
// Time series
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub row: usize,
    pub timestamp: NaiveDateTime,
    /// One entry per requested column, in column order.
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeSeries {
    pub columns: Vec<String>,
    pub points: Vec<TimeSeriesPoint>,
    /// Rows dropped because their timestamp was missing or unparseable.
    pub missing_timestamps: usize,
    pub warnings: Vec<AnalysisWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_serialization() {
        let warning = AnalysisWarning::empty_input("histogram", "column 'GHI' has no values");
        let json = serde_json::to_string(&warning).unwrap();
        assert!(json.contains("\"kind\":\"empty_input\""));
        assert!(json.contains("histogram"));
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let summary = ColumnSummary {
            column: "GHI".to_string(),
            count: 1,
            mean: 5.0,
            std: f64::NAN,
            min: 5.0,
            q25: 5.0,
            q50: 5.0,
            q75: 5.0,
            max: 5.0,
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"std\":null"));
        assert!(json.contains("\"25%\":5.0"));
    }

    #[test]
    fn test_wind_exclusions_total() {
        let excluded = WindExclusions {
            missing_direction: 1,
            missing_speed: 2,
            negative_speed: 3,
        };
        assert_eq!(excluded.total(), 6);
    }
}
