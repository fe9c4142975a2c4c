//! Error types for the expense report generator.
//!
//! Every failure of a single `build_or_update` call surfaces as one of these;
//! the batch entry point collects them per employee instead of aborting.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for report generation
#[derive(Error, Debug)]
pub enum GastosError {
    /// No records were supplied for an employee/month
    #[error("No records to build a worksheet from")]
    EmptyInput,

    /// A date was not in DD/MM/YYYY form
    #[error("Invalid date '{value}' (expected DD/MM/YYYY)")]
    DateParse { value: String },

    /// A CSV row carried an invalid date
    #[error("Invalid date '{value}' on CSV line {line} (expected DD/MM/YYYY)")]
    CsvDate { line: u64, value: String },

    /// Records handed to a single worksheet build span more than one month
    #[error("Records for {employee} span several months: expected {expected}, found {found}")]
    MixedMonths {
        employee: String,
        expected: String,
        found: String,
    },

    /// File system errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Existing file is not a workbook we can read, or the writer rejected the layout
    #[error("Workbook error in {path}: {message}")]
    Format { path: PathBuf, message: String },

    /// CSV reading errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Required CSV columns are absent
    #[error("The CSV file must have the columns: nombre, proyecto, fecha (missing: {})", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Per-diem amount could not be parsed or is negative
    #[error("Invalid per-diem amount: {0}")]
    InvalidAmount(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for report generation
pub type GastosResult<T> = Result<T, GastosError>;

impl GastosError {
    pub(crate) fn format(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        GastosError::Format {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
