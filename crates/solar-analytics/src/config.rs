//! Configuration for analysis calls.
//!
//! Every tunable parameter the components accept lives here with its
//! documented default, so callers thread parameters explicitly instead of
//! relying on ambient state.

use serde::{Deserialize, Serialize};

/// How wind-rose sector frequencies are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Normalization {
    /// Raw observation counts
    Counts,
    /// Fraction of included observations; sectors sum to 1.0
    #[default]
    Fraction,
    /// Percentage of included observations; sectors sum to 100.0
    Percent,
}

impl Normalization {
    /// Convert a raw count into the configured unit given the total count.
    pub fn apply(self, count: usize, total: usize) -> f64 {
        match self {
            Self::Counts => count as f64,
            Self::Fraction if total > 0 => count as f64 / total as f64,
            Self::Percent if total > 0 => count as f64 / total as f64 * 100.0,
            _ => 0.0,
        }
    }
}

/// Parameters for every analytics component.
///
/// Use [`AnalysisConfig::builder()`] for a validated configuration.
///
/// # Example
///
/// ```rust,ignore
/// use solar_analytics::config::{AnalysisConfig, Normalization};
///
/// let config = AnalysisConfig::builder()
///     .zscore_threshold(2.5)
///     .wind_sectors(8)
///     .wind_normalization(Normalization::Percent)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Absolute z-score above which a row is flagged.
    /// Default: 3.0
    pub zscore_threshold: f64,

    /// Number of equal-width histogram bins per column.
    /// Default: 10
    pub histogram_bins: usize,

    /// Columns to bin, `None` for the GHI/DNI/DHI/WS preset.
    /// Default: None
    #[serde(default)]
    pub histogram_columns: Option<Vec<String>>,

    /// Number of equal angular sectors spanning 0-360 degrees.
    /// Default: 16
    pub wind_sectors: usize,

    /// Number of wind speed sub-bins per sector, `None` to disable.
    /// Default: Some(6)
    pub wind_speed_bins: Option<usize>,

    /// Unit for sector frequencies.
    /// Default: Fraction
    pub wind_normalization: Normalization,

    /// Fraction of the sector width a rendered bar should occupy.
    /// Default: 0.8
    pub wind_opening: f64,

    /// Linear scale applied to the bubble size source column.
    /// Default: 1.0
    pub bubble_scale: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            zscore_threshold: 3.0,
            histogram_bins: 10,
            histogram_columns: None,
            wind_sectors: 16,
            wind_speed_bins: Some(6),
            wind_normalization: Normalization::default(),
            wind_opening: 0.8,
            bubble_scale: 1.0,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Width of one wind sector in degrees.
    pub fn wind_sector_width(&self) -> f64 {
        360.0 / self.wind_sectors as f64
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        validate_threshold(self.zscore_threshold)?;
        validate_bins("histogram_bins", self.histogram_bins)?;
        if self.histogram_columns.as_ref().is_some_and(Vec::is_empty) {
            return Err(ConfigValidationError::EmptyColumnList("histogram_columns".to_string()));
        }
        validate_bins("wind_sectors", self.wind_sectors)?;
        if let Some(bins) = self.wind_speed_bins {
            validate_bins("wind_speed_bins", bins)?;
        }
        if !(self.wind_opening > 0.0 && self.wind_opening <= 1.0) {
            return Err(ConfigValidationError::InvalidOpening(self.wind_opening));
        }
        validate_scale(self.bubble_scale)?;
        Ok(())
    }
}

pub(crate) fn validate_threshold(threshold: f64) -> Result<(), ConfigValidationError> {
    if threshold.is_finite() && threshold >= 0.0 {
        Ok(())
    } else {
        Err(ConfigValidationError::InvalidThreshold(threshold))
    }
}

pub(crate) fn validate_bins(field: &str, bins: usize) -> Result<(), ConfigValidationError> {
    if bins == 0 {
        return Err(ConfigValidationError::InvalidBinCount {
            field: field.to_string(),
            value: bins,
        });
    }
    Ok(())
}

pub(crate) fn validate_scale(scale: f64) -> Result<(), ConfigValidationError> {
    if scale.is_finite() {
        Ok(())
    } else {
        Err(ConfigValidationError::InvalidScale(scale))
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid z-score threshold: {0} (must be finite and non-negative)")]
    InvalidThreshold(f64),

    #[error("Invalid bin count for '{field}': {value} (must be at least 1)")]
    InvalidBinCount { field: String, value: usize },

    #[error("Column list '{0}' is empty")]
    EmptyColumnList(String),

    #[error("Invalid sector width: {0} degrees (must evenly divide 360)")]
    InvalidSectorWidth(f64),

    #[error("Invalid opening: {0} (must be in (0, 1])")]
    InvalidOpening(f64),

    #[error("Invalid bubble scale: {0} (must be finite)")]
    InvalidScale(f64),
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    zscore_threshold: Option<f64>,
    histogram_bins: Option<usize>,
    histogram_columns: Option<Vec<String>>,
    wind_sectors: Option<usize>,
    wind_sector_width: Option<f64>,
    wind_speed_bins: Option<Option<usize>>,
    wind_normalization: Option<Normalization>,
    wind_opening: Option<f64>,
    bubble_scale: Option<f64>,
}

impl AnalysisConfigBuilder {
    /// Set the z-score threshold for outlier flagging.
    pub fn zscore_threshold(mut self, threshold: f64) -> Self {
        self.zscore_threshold = Some(threshold);
        self
    }

    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Restrict histograms to `columns` instead of the default preset.
    pub fn histogram_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.histogram_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the number of wind-rose sectors.
    pub fn wind_sectors(mut self, sectors: usize) -> Self {
        self.wind_sectors = Some(sectors);
        self.wind_sector_width = None;
        self
    }

    /// Set the wind-rose sector width in degrees.
    ///
    /// The width must divide 360 evenly; it overrides [`Self::wind_sectors`].
    pub fn wind_sector_width(mut self, degrees: f64) -> Self {
        self.wind_sector_width = Some(degrees);
        self
    }

    /// Set the number of wind speed sub-bins, or `None` to disable them.
    pub fn wind_speed_bins(mut self, bins: Option<usize>) -> Self {
        self.wind_speed_bins = Some(bins);
        self
    }

    /// Set the wind-rose frequency unit.
    pub fn wind_normalization(mut self, normalization: Normalization) -> Self {
        self.wind_normalization = Some(normalization);
        self
    }

    /// Set the rendered bar width fraction.
    pub fn wind_opening(mut self, opening: f64) -> Self {
        self.wind_opening = Some(opening);
        self
    }

    /// Set the bubble size scale factor.
    pub fn bubble_scale(mut self, scale: f64) -> Self {
        self.bubble_scale = Some(scale);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();

        let wind_sectors = match self.wind_sector_width {
            Some(width) => sectors_from_width(width)?,
            None => self.wind_sectors.unwrap_or(defaults.wind_sectors),
        };

        let config = AnalysisConfig {
            zscore_threshold: self.zscore_threshold.unwrap_or(defaults.zscore_threshold),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            histogram_columns: self.histogram_columns,
            wind_sectors,
            wind_speed_bins: self.wind_speed_bins.unwrap_or(defaults.wind_speed_bins),
            wind_normalization: self.wind_normalization.unwrap_or_default(),
            wind_opening: self.wind_opening.unwrap_or(defaults.wind_opening),
            bubble_scale: self.bubble_scale.unwrap_or(defaults.bubble_scale),
        };

        config.validate()?;
        Ok(config)
    }
}

fn sectors_from_width(width: f64) -> Result<usize, ConfigValidationError> {
    if !(width.is_finite() && width > 0.0 && width <= 360.0) {
        return Err(ConfigValidationError::InvalidSectorWidth(width));
    }
    let sectors = (360.0 / width).round();
    if ((sectors * width) - 360.0).abs() > 1e-9 {
        return Err(ConfigValidationError::InvalidSectorWidth(width));
    }
    Ok(sectors as usize)
}
