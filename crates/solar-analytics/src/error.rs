//! Error types for the analytics engine.
//!
//! Schema violations are fatal and raised before any computation starts.
//! Everything else (empty inputs, zero variance) degrades to an empty or
//! `NaN`-bearing result and never reaches this module.
//!
//! Errors are serializable so a presentation layer can display them
//! without knowing the concrete variant.

use crate::config::ConfigValidationError;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// A dataset does not satisfy the column contract a component needs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A required column is absent from the dataset.
    #[error("Required column '{0}' not found in dataset")]
    MissingColumn(String),

    /// A column exists but its dtype cannot carry the expected semantic type.
    #[error("Column '{column}' has dtype {dtype}, expected {expected}")]
    WrongType {
        column: String,
        dtype: String,
        expected: String,
    },
}

impl SchemaError {
    /// Name of the offending column.
    pub fn column(&self) -> &str {
        match self {
            Self::MissingColumn(column) => column,
            Self::WrongType { column, .. } => column,
        }
    }
}

/// The main error type for analytics calls.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Dataset does not match the schema contract.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Invalid analysis parameters.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// IO error wrapper (dataset loading only).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization of a result failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalyticsError>,
    },
}

impl AnalyticsError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalyticsError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for the presentation layer.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Schema(SchemaError::MissingColumn(_)) => "MISSING_COLUMN",
            Self::Schema(SchemaError::WrongType { .. }) => "WRONG_COLUMN_TYPE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error is a schema violation (possibly wrapped in context).
    pub fn is_schema_error(&self) -> bool {
        match self {
            Self::Schema(_) => true,
            Self::WithContext { source, .. } => source.is_schema_error(),
            _ => false,
        }
    }
}

impl Serialize for AnalyticsError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalyticsError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalyticsError::Polars(e).with_context(context))
    }
}
