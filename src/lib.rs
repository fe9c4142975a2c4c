//! Monthly expense (gastos) workbooks from a CSV of travel records.
//!
//! - `record`: input rows, dates and project codes
//! - `grouping`: per-employee and per-month partitioning
//! - `layout`: the fixed 31-day sheet layout and its formulas
//! - `style`: cell formatting and A4 page setup
//! - `workbook`: load / merge / save of the yearly workbook
//! - `report`: batch entry point with per-employee failures
//! - `csv_input`, `config`: the outer input layers

pub mod config;
pub mod csv_input;
pub mod error;
pub mod grouping;
pub mod layout;
pub mod record;
pub mod report;
pub mod sheet;
pub mod style;
pub mod workbook;

pub use error::{GastosError, GastosResult};
pub use record::ExpenseRecord;
pub use report::{GenerationReport, generate_reports};
pub use workbook::build_or_update;
