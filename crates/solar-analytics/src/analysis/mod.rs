//! Analytics components.
//!
//! Each component is a pure function of a read-only DataFrame and explicit
//! parameters. None of them depends on another at runtime; they share only
//! the schema.

pub mod bubble;
pub mod correlation;
pub mod descriptive;
pub mod histogram;
pub mod outliers;
pub mod timeseries;
pub mod wind_rose;

mod analyzer;

pub use analyzer::{AnalysisKind, AnalysisOutput, SolarAnalyzer};
pub use bubble::bubble_chart;
pub use correlation::correlation_matrix;
pub use descriptive::describe;
pub use histogram::histograms;
pub use outliers::detect_outliers;
pub use timeseries::time_series;
pub use wind_rose::{WindRoseParams, wind_rose};
