//! Error type shared by the loader, normalizer and report writers.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no spreadsheet file (.xlsx, .xlsm, .xls, .ods) found in {}", .0.display())]
    NoWorkbookFound(PathBuf),

    #[error("required column '{field}' not found (looked for {candidates:?})")]
    MissingColumn {
        field: &'static str,
        candidates: Vec<String>,
    },

    #[error("sheet '{sheet}' not found in {}; available sheets: {available:?}", .path.display())]
    SheetNotFound {
        sheet: String,
        path: PathBuf,
        available: Vec<String>,
    },

    #[error("failed to read workbook {}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("week end {end} is earlier than week start {start}")]
    InvalidWeekRange { start: NaiveDate, end: NaiveDate },

    #[error("an explicit week needs both a start and an end date")]
    IncompleteWeekRange,

    #[error("unsupported export format for {}; use .xlsx, .csv or .json", .0.display())]
    UnsupportedExport(PathBuf),

    #[error("invalid configuration file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

pub type Result<T> = std::result::Result<T, ReportError>;
