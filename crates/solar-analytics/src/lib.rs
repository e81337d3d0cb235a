//! Solar Telemetry Analytics
//!
//! Descriptive and exploratory statistics over solar-irradiance and weather
//! telemetry, built on Polars.
//!
//! # Overview
//!
//! The engine turns a time-indexed sensor table into:
//!
//! - **Summary statistics**: count, mean, std, quartiles, min/max and medians
//! - **Correlation**: pairwise-complete Pearson matrix over irradiance,
//!   module temperature and wind columns
//! - **Z-score outliers**: per-row flags with the flagged rows extracted
//! - **Wind rose**: circular binning of direction/speed pairs
//! - **Histograms**: equal-width bins per column
//! - **Bubble chart**: (x, y, size, color) projection for plotting
//! - **Time series**: timestamped projections of selected columns
//!
//! Every component is a pure function of a read-only [`DataFrame`] and
//! explicit parameters. Schema violations fail fast with
//! [`SchemaError`]; empty inputs and zero variance degrade to empty or `NaN`
//! results with an [`AnalysisWarning`] attached.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use solar_analytics::{AnalysisConfig, AnalysisKind, SolarAnalyzer, loader};
//!
//! let df = loader::load_site(loader::Site::BeninMalanville, "data")?;
//!
//! let config = AnalysisConfig::builder()
//!     .zscore_threshold(3.0)
//!     .wind_sectors(16)
//!     .build()?;
//! let analyzer = SolarAnalyzer::new(config)?;
//!
//! let rose = analyzer.wind_rose(&df)?;
//! for sector in &rose.sectors {
//!     println!("[{:>5.1}, {:>5.1}) {:.3}", sector.start, sector.end, sector.frequency);
//! }
//!
//! let output = analyzer.run(&df, AnalysisKind::ZScore)?;
//! println!("{}", output.to_json()?);
//! ```
//!
//! [`DataFrame`]: polars::prelude::DataFrame

pub mod analysis;
pub mod config;
pub mod error;
pub mod loader;
pub mod schema;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use analysis::{
    AnalysisKind, AnalysisOutput, SolarAnalyzer, WindRoseParams, bubble_chart, correlation_matrix,
    describe, detect_outliers, histograms, time_series, wind_rose,
};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError, Normalization};
pub use error::{AnalyticsError, Result as AnalyticsResult, ResultExt, SchemaError};
pub use loader::{Site, load_csv, load_site};
pub use schema::{
    BUBBLE_COLUMNS, BubbleColumns, CLEANING_COLUMNS, CORRELATION_COLUMNS, Field,
    HISTOGRAM_COLUMNS, SemanticType, TIMESERIES_COLUMNS, ZSCORE_COLUMNS, validate_dataset,
};
pub use types::{
    AnalysisWarning, BubbleChart, BubblePoint, ColumnSummary, ColumnZScores, CorrelationMatrix,
    DescriptiveStatistics, Histogram, HistogramSet, OutlierReport, TimeSeries, TimeSeriesPoint,
    WindExclusions, WindRose, WindSector,
};
