//! Dataset loading for the known measurement sites.
//!
//! This adapter sits outside the analytics core: it turns a CSV file into a
//! validated DataFrame and nothing else.

use crate::error::{Result, ResultExt};
use crate::schema::validate_dataset;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Measurement sites with published datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Site {
    BeninMalanville,
    SierraLeoneBumbuna,
    TogoDapaong,
}

impl Site {
    pub const ALL: [Site; 3] = [
        Site::BeninMalanville,
        Site::SierraLeoneBumbuna,
        Site::TogoDapaong,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Self::BeninMalanville => "Benin (Malanville)",
            Self::SierraLeoneBumbuna => "Sierra Leone (Bumbuna)",
            Self::TogoDapaong => "Togo (Dapaong)",
        }
    }

    /// File name of the site's dataset inside the data directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::BeninMalanville => "benin-malanville.csv",
            Self::SierraLeoneBumbuna => "sierraleone-bumbuna.csv",
            Self::TogoDapaong => "togo-dapaong_qc.csv",
        }
    }

    pub fn path_in(self, data_dir: impl AsRef<Path>) -> PathBuf {
        data_dir.as_ref().join(self.file_name())
    }
}

/// Read a CSV file with a header row, parsing `Timestamp` as a datetime
/// where possible, and validate it against the dataset contract.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    info!("Loading dataset from: {}", path.display());

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .with_parse_options(CsvParseOptions::default().with_try_parse_dates(true))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .context(format!("Opening {}", path.display()))?
        .finish()
        .context(format!("Reading {}", path.display()))?;

    let report = validate_dataset(&df)?;
    debug!(
        "Loaded {} rows, extra columns: {:?}",
        report.rows, report.extra_columns
    );
    Ok(df)
}

/// Load the dataset of `site` from `data_dir`.
pub fn load_site(site: Site, data_dir: impl AsRef<Path>) -> Result<DataFrame> {
    load_csv(site.path_in(data_dir)).context(format!("Loading {}", site.display_name()))
}
