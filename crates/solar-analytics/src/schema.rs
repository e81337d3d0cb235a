//! Column contract for solar telemetry datasets.
//!
//! Every component validates the columns it reads against this module before
//! computing anything. Column-subset literals used by the dashboard pages are
//! named constants here so a mismatch fails fast with a [`SchemaError`].

use crate::error::SchemaError;
use crate::utils::is_numeric_dtype;
use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const TIMESTAMP: &str = "Timestamp";
pub const GHI: &str = "GHI";
pub const DNI: &str = "DNI";
pub const DHI: &str = "DHI";
pub const MOD_A: &str = "ModA";
pub const MOD_B: &str = "ModB";
pub const TAMB: &str = "Tamb";
pub const RH: &str = "RH";
pub const WS: &str = "WS";
pub const WS_GUST: &str = "WSgust";
pub const WD: &str = "WD";
pub const TMOD_A: &str = "TModA";
pub const TMOD_B: &str = "TModB";

/// Columns of the correlation heatmap, in matrix order.
pub const CORRELATION_COLUMNS: &[&str] = &[GHI, DNI, DHI, TMOD_A, TMOD_B, WS, WS_GUST];

/// Columns scored for z-score outliers.
pub const ZSCORE_COLUMNS: &[&str] = &[GHI, DNI, DHI, TAMB];

/// Columns shown on the histogram page.
pub const HISTOGRAM_COLUMNS: &[&str] = &[GHI, DNI, DHI, WS];

/// Irradiance and ambient temperature over time.
pub const TIMESERIES_COLUMNS: &[&str] = &[GHI, DNI, DHI, TAMB];

/// Module sensor readings over time, used to judge panel cleaning.
pub const CLEANING_COLUMNS: &[&str] = &[MOD_A, MOD_B];

/// Column roles for the bubble chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BubbleColumns<'a> {
    pub x: &'a str,
    pub y: &'a str,
    pub size: &'a str,
    pub color: &'a str,
}

/// GHI against ambient temperature, sized by humidity, colored by gusts.
pub const BUBBLE_COLUMNS: BubbleColumns<'static> = BubbleColumns {
    x: GHI,
    y: TAMB,
    size: RH,
    color: WS_GUST,
};

/// Physical meaning of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SemanticType {
    Timestamp,
    /// W/m², may be negative from sensor noise
    Irradiance,
    /// °C
    Temperature,
    ModuleReading,
    /// m/s
    WindSpeed,
    /// Degrees, wraps at 360
    WindDirection,
    /// Percent, only used as a bubble size weight
    Humidity,
}

impl SemanticType {
    /// Whether values of this type are read as floating point.
    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::Timestamp)
    }

    fn expected_dtype(self) -> &'static str {
        match self {
            Self::Timestamp => "datetime, date or string",
            _ => "numeric or string",
        }
    }
}

/// A column required by the dataset contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Timestamp,
    Ghi,
    Dni,
    Dhi,
    ModA,
    ModB,
    Tamb,
    Rh,
    Ws,
    WsGust,
    Wd,
    TModA,
    TModB,
}

impl Field {
    /// All required columns, in the order the site files use.
    pub const ALL: [Field; 13] = [
        Field::Timestamp,
        Field::Ghi,
        Field::Dni,
        Field::Dhi,
        Field::ModA,
        Field::ModB,
        Field::Tamb,
        Field::Rh,
        Field::Ws,
        Field::WsGust,
        Field::Wd,
        Field::TModA,
        Field::TModB,
    ];

    /// Column name in the dataset.
    pub fn name(self) -> &'static str {
        match self {
            Self::Timestamp => TIMESTAMP,
            Self::Ghi => GHI,
            Self::Dni => DNI,
            Self::Dhi => DHI,
            Self::ModA => MOD_A,
            Self::ModB => MOD_B,
            Self::Tamb => TAMB,
            Self::Rh => RH,
            Self::Ws => WS,
            Self::WsGust => WS_GUST,
            Self::Wd => WD,
            Self::TModA => TMOD_A,
            Self::TModB => TMOD_B,
        }
    }

    pub fn semantic_type(self) -> SemanticType {
        match self {
            Self::Timestamp => SemanticType::Timestamp,
            Self::Ghi | Self::Dni | Self::Dhi => SemanticType::Irradiance,
            Self::Tamb | Self::TModA | Self::TModB => SemanticType::Temperature,
            Self::ModA | Self::ModB => SemanticType::ModuleReading,
            Self::Ws | Self::WsGust => SemanticType::WindSpeed,
            Self::Wd => SemanticType::WindDirection,
            Self::Rh => SemanticType::Humidity,
        }
    }

    /// Look up a contract field by column name.
    pub fn from_name(name: &str) -> Option<Field> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of validating a whole dataset against the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    pub rows: usize,
    /// Columns present in the dataset that the contract does not name.
    pub extra_columns: Vec<String>,
}

/// Validate every contract column eagerly.
pub fn validate_dataset(df: &DataFrame) -> Result<SchemaReport, SchemaError> {
    for field in Field::ALL {
        check_column(df, field.name(), field.semantic_type())?;
    }

    let extra_columns = df
        .get_column_names()
        .iter()
        .filter(|name| Field::from_name(name.as_str()).is_none())
        .map(|name| name.to_string())
        .collect();

    Ok(SchemaReport {
        rows: df.height(),
        extra_columns,
    })
}

/// Check that all `columns` exist and carry numeric-compatible dtypes.
///
/// Columns outside the contract are accepted if they are numeric.
pub fn require_columns(df: &DataFrame, columns: &[&str]) -> Result<(), SchemaError> {
    for &name in columns {
        let semantic = Field::from_name(name)
            .map(Field::semantic_type)
            .unwrap_or(SemanticType::ModuleReading);
        check_column(df, name, semantic)?;
    }
    Ok(())
}

fn check_column(df: &DataFrame, name: &str, semantic: SemanticType) -> Result<(), SchemaError> {
    let column = df
        .column(name)
        .map_err(|_| SchemaError::MissingColumn(name.to_string()))?;
    let dtype = column.dtype();

    let accepted = if semantic.is_numeric() {
        is_numeric_dtype(dtype) || matches!(dtype, DataType::String | DataType::Null)
    } else {
        matches!(
            dtype,
            DataType::Datetime(_, _) | DataType::Date | DataType::String | DataType::Null
        )
    };

    if accepted {
        Ok(())
    } else {
        Err(SchemaError::WrongType {
            column: name.to_string(),
            dtype: dtype.to_string(),
            expected: semantic.expected_dtype().to_string(),
        })
    }
}

/// Read a numeric column as `f64`, with nulls, non-finite values (`NaN`,
/// `inf`) and unparseable strings all mapped to `None`.
pub fn numeric_values(df: &DataFrame, name: &str) -> crate::error::Result<Vec<Option<f64>>> {
    require_columns(df, &[name])?;
    let series = df.column(name)?.as_materialized_series();
    let float_series = series.cast(&DataType::Float64)?;
    let values = float_series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|val| val.is_finite()))
        .collect();
    Ok(values)
}

/// Names of all columns the descriptive statistics cover: every numeric
/// column, plus contract fields stored as strings.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|column| {
            let dtype = column.dtype();
            is_numeric_dtype(dtype)
                || (matches!(dtype, DataType::String | DataType::Null)
                    && Field::from_name(column.name().as_str())
                        .is_some_and(|field| field.semantic_type().is_numeric()))
        })
        .map(|column| column.name().to_string())
        .collect()
}

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a timestamp string in one of the formats the site files use.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}

/// Read the `Timestamp` column, mapping missing or unparseable cells to `None`.
pub fn timestamp_values(df: &DataFrame) -> crate::error::Result<Vec<Option<NaiveDateTime>>> {
    check_column(df, TIMESTAMP, SemanticType::Timestamp)?;
    let series = df.column(TIMESTAMP)?.as_materialized_series();

    let values = match series.dtype() {
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let raw = series.cast(&DataType::Int64)?;
            raw.i64()?
                .into_iter()
                .map(|v| v.and_then(|ticks| datetime_from_ticks(ticks, unit)))
                .collect()
        }
        DataType::Date => {
            let days = series.cast(&DataType::Int32)?;
            days.i32()?
                .into_iter()
                .map(|v| {
                    v.and_then(|d| DateTime::from_timestamp(i64::from(d) * 86_400, 0))
                        .map(|dt| dt.naive_utc())
                })
                .collect()
        }
        DataType::String => series
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_timestamp))
            .collect(),
        _ => vec![None; series.len()],
    };

    Ok(values)
}

fn datetime_from_ticks(ticks: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let datetime = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(ticks)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(ticks),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(ticks),
    };
    datetime.map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_frame() -> DataFrame {
        df![
            "Timestamp" => ["2021-08-09 00:01", "2021-08-09 00:02"],
            "GHI" => [1.0, 2.0],
            "DNI" => [0.0, 0.5],
            "DHI" => [1.0, 1.5],
            "ModA" => [0.0, 0.0],
            "ModB" => [0.0, 0.0],
            "Tamb" => [26.2, 26.3],
            "RH" => [93.4, 93.6],
            "WS" => [0.0, 0.3],
            "WSgust" => [0.4, 1.1],
            "WD" => [122.1, 355.0],
            "TModA" => [24.7, 24.7],
            "TModB" => [24.4, 24.4],
            "Comments" => [None::<&str>, None],
        ]
        .unwrap()
    }

    // ==================== Field tests ====================

    #[test]
    fn test_field_lookup_round_trip() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.name()), Some(field));
        }
        assert_eq!(Field::from_name("Comments"), None);
    }

    #[test]
    fn test_semantic_types() {
        assert_eq!(Field::Wd.semantic_type(), SemanticType::WindDirection);
        assert_eq!(Field::Rh.semantic_type(), SemanticType::Humidity);
        assert!(!Field::Timestamp.semantic_type().is_numeric());
        assert!(Field::Ghi.semantic_type().is_numeric());
    }

    // ==================== validate_dataset tests ====================

    #[test]
    fn test_validate_full_dataset() {
        let report = validate_dataset(&full_frame()).unwrap();
        assert_eq!(report.rows, 2);
        assert_eq!(report.extra_columns, vec!["Comments".to_string()]);
    }

    #[test]
    fn test_validate_reports_missing_column() {
        let df = full_frame().drop("RH").unwrap();
        let err = validate_dataset(&df).unwrap_err();
        assert_eq!(err, SchemaError::MissingColumn("RH".to_string()));
    }

    #[test]
    fn test_require_rejects_boolean_column() {
        let df = df!["WD" => [true, false]].unwrap();
        let err = require_columns(&df, &[WD]).unwrap_err();
        assert!(matches!(err, SchemaError::WrongType { ref column, .. } if column == "WD"));
    }

    // ==================== numeric_values tests ====================

    #[test]
    fn test_numeric_values_maps_nan_and_null_to_missing() {
        let df = df!["GHI" => [Some(1.0), None, Some(f64::NAN), Some(-3.5)]].unwrap();
        let values = numeric_values(&df, GHI).unwrap();
        assert_eq!(values, vec![Some(1.0), None, None, Some(-3.5)]);
    }

    #[test]
    fn test_numeric_values_maps_infinities_to_missing() {
        let df = df!["WD" => [f64::INFINITY, 90.0, f64::NEG_INFINITY]].unwrap();
        let values = numeric_values(&df, WD).unwrap();
        assert_eq!(values, vec![None, Some(90.0), None]);
    }

    #[test]
    fn test_numeric_values_coerces_strings() {
        let df = df!["Tamb" => ["21.5", "n/a", "", "19"]].unwrap();
        let values = numeric_values(&df, TAMB).unwrap();
        assert_eq!(values, vec![Some(21.5), None, None, Some(19.0)]);
    }

    #[test]
    fn test_numeric_values_missing_column() {
        let df = df!["GHI" => [1.0]].unwrap();
        let err = numeric_values(&df, DNI).unwrap_err();
        assert!(err.is_schema_error());
    }

    #[test]
    fn test_numeric_column_names_skips_timestamp_and_text() {
        let names = numeric_column_names(&full_frame());
        assert!(names.contains(&"GHI".to_string()));
        assert!(!names.contains(&"Timestamp".to_string()));
        assert!(!names.contains(&"Comments".to_string()));
        assert_eq!(names.len(), 12);
    }

    // ==================== timestamp tests ====================

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2021-08-09 00:01").is_some());
        assert!(parse_timestamp("2021-08-09 00:01:30").is_some());
        assert!(parse_timestamp("2021-08-09T00:01:30").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_timestamp_values_from_strings() {
        let df = df!["Timestamp" => [Some("2021-08-09 00:01"), Some("bad"), None]].unwrap();
        let values = timestamp_values(&df).unwrap();
        assert!(values[0].is_some());
        assert!(values[1].is_none());
        assert!(values[2].is_none());
    }

    #[test]
    fn test_timestamp_values_from_datetime() {
        let df = df!["Timestamp" => [0i64, 60_000]].unwrap();
        let df = df
            .lazy()
            .with_column(col("Timestamp").cast(DataType::Datetime(TimeUnit::Milliseconds, None)))
            .collect()
            .unwrap();
        let values = timestamp_values(&df).unwrap();
        let first = values[0].unwrap();
        let second = values[1].unwrap();
        assert_eq!((second - first).num_seconds(), 60);
    }
}
