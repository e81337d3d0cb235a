//! Dispatch from a requested analysis to its component.

use super::{bubble, correlation, descriptive, histogram, outliers, timeseries, wind_rose};
use crate::config::AnalysisConfig;
use crate::error::{Result, ResultExt};
use crate::schema::{
    BUBBLE_COLUMNS, CLEANING_COLUMNS, CORRELATION_COLUMNS, HISTOGRAM_COLUMNS, TIMESERIES_COLUMNS,
    ZSCORE_COLUMNS,
};
use crate::types::{
    BubbleChart, CorrelationMatrix, DescriptiveStatistics, HistogramSet, OutlierReport, TimeSeries,
    WindRose,
};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;
use tracing::info;

/// The analyses a presentation layer can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisKind {
    Summary,
    TimeSeries,
    CleaningImpact,
    Correlation,
    WindRose,
    ZScore,
    Histograms,
    Bubble,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 8] = [
        AnalysisKind::Summary,
        AnalysisKind::TimeSeries,
        AnalysisKind::CleaningImpact,
        AnalysisKind::Correlation,
        AnalysisKind::WindRose,
        AnalysisKind::ZScore,
        AnalysisKind::Histograms,
        AnalysisKind::Bubble,
    ];

    /// Human-readable name.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Summary => "Summary Statistics",
            Self::TimeSeries => "Time Series Analysis",
            Self::CleaningImpact => "Impact of Cleaning",
            Self::Correlation => "Correlation Analysis",
            Self::WindRose => "Wind Analysis",
            Self::ZScore => "Z-Score Analysis",
            Self::Histograms => "Histograms",
            Self::Bubble => "Bubble Chart",
        }
    }
}

/// Result of one analysis call.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "analysis", content = "result", rename_all = "snake_case")]
pub enum AnalysisOutput {
    Summary(DescriptiveStatistics),
    TimeSeries(TimeSeries),
    CleaningImpact(TimeSeries),
    Correlation(CorrelationMatrix),
    WindRose(WindRose),
    ZScore(OutlierReport),
    Histograms(HistogramSet),
    Bubble(BubbleChart),
}

impl AnalysisOutput {
    /// Pretty-printed JSON for the presentation layer. Undefined values
    /// render as `null`.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn kind(&self) -> AnalysisKind {
        match self {
            Self::Summary(_) => AnalysisKind::Summary,
            Self::TimeSeries(_) => AnalysisKind::TimeSeries,
            Self::CleaningImpact(_) => AnalysisKind::CleaningImpact,
            Self::Correlation(_) => AnalysisKind::Correlation,
            Self::WindRose(_) => AnalysisKind::WindRose,
            Self::ZScore(_) => AnalysisKind::ZScore,
            Self::Histograms(_) => AnalysisKind::Histograms,
            Self::Bubble(_) => AnalysisKind::Bubble,
        }
    }
}

/// Runs analyses with a fixed configuration.
///
/// Holds no state between calls, so one analyzer can serve many datasets
/// from many threads.
#[derive(Debug, Clone, Default)]
pub struct SolarAnalyzer {
    config: AnalysisConfig,
}

assert_impl_all!(SolarAnalyzer: Send, Sync);

impl SolarAnalyzer {
    /// Create an analyzer, validating the configuration.
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the requested analysis on `df`.
    pub fn run(&self, df: &DataFrame, kind: AnalysisKind) -> Result<AnalysisOutput> {
        info!("Running {} on {} rows", kind.display_name(), df.height());
        let output = match kind {
            AnalysisKind::Summary => AnalysisOutput::Summary(self.summary(df)?),
            AnalysisKind::TimeSeries => {
                AnalysisOutput::TimeSeries(timeseries::time_series(df, TIMESERIES_COLUMNS)?)
            }
            AnalysisKind::CleaningImpact => {
                AnalysisOutput::CleaningImpact(timeseries::time_series(df, CLEANING_COLUMNS)?)
            }
            AnalysisKind::Correlation => AnalysisOutput::Correlation(self.correlation(df)?),
            AnalysisKind::WindRose => AnalysisOutput::WindRose(self.wind_rose(df)?),
            AnalysisKind::ZScore => AnalysisOutput::ZScore(self.outliers(df)?),
            AnalysisKind::Histograms => AnalysisOutput::Histograms(self.histograms(df)?),
            AnalysisKind::Bubble => AnalysisOutput::Bubble(self.bubble_chart(df)?),
        };
        Ok(output)
    }

    pub fn summary(&self, df: &DataFrame) -> Result<DescriptiveStatistics> {
        descriptive::describe(df).context("Summary statistics")
    }

    pub fn correlation(&self, df: &DataFrame) -> Result<CorrelationMatrix> {
        correlation::correlation_matrix(df, CORRELATION_COLUMNS).context("Correlation analysis")
    }

    pub fn outliers(&self, df: &DataFrame) -> Result<OutlierReport> {
        outliers::detect_outliers(df, ZSCORE_COLUMNS, self.config.zscore_threshold)
            .context("Z-score analysis")
    }

    pub fn wind_rose(&self, df: &DataFrame) -> Result<WindRose> {
        wind_rose::wind_rose(df, (&self.config).into()).context("Wind analysis")
    }

    /// Histograms of the configured columns, or the default preset.
    pub fn histograms(&self, df: &DataFrame) -> Result<HistogramSet> {
        let columns: Vec<&str> = match &self.config.histogram_columns {
            Some(columns) => columns.iter().map(String::as_str).collect(),
            None => HISTOGRAM_COLUMNS.to_vec(),
        };
        histogram::histograms(df, &columns, self.config.histogram_bins).context("Histograms")
    }

    pub fn bubble_chart(&self, df: &DataFrame) -> Result<BubbleChart> {
        bubble::bubble_chart(df, BUBBLE_COLUMNS, self.config.bubble_scale).context("Bubble chart")
    }
}
