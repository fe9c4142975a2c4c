use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::error::{GastosError, GastosResult};

pub const DATE_FORMAT: &str = "%d/%m/%Y";
const PROJECT_SEPARATOR: &str = " - ";

// --- Data Structs ---

/// One row of input: who travelled, for which project, on which day.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExpenseRecord {
    #[serde(rename = "nombre")]
    pub employee_name: String,
    #[serde(rename = "proyecto")]
    pub project: String,
    #[serde(rename = "fecha")]
    pub date: String,
}

impl ExpenseRecord {
    pub fn new(employee_name: impl Into<String>, project: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            employee_name: employee_name.into(),
            project: project.into(),
            date: date.into(),
        }
    }

    pub fn parsed_date(&self) -> GastosResult<NaiveDate> {
        parse_date(&self.date)
    }

    pub fn project_code(&self) -> &str {
        project_code(&self.project)
    }
}

/// Month a worksheet covers. The sheet is named `<MONTH_NAME>_<YEAR>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthContext {
    pub month_name: &'static str,
    pub year: i32,
    pub month: u32,
}

impl MonthContext {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            month_name: month_name(date.month()),
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn sheet_name(&self) -> String {
        format!("{}_{}", self.month_name, self.year)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

pub fn parse_date(value: &str) -> GastosResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| GastosError::DateParse {
        value: value.to_string(),
    })
}

/// Text before the first `" - "`, or the whole (trimmed) string.
pub fn project_code(project: &str) -> &str {
    match project.split_once(PROJECT_SEPARATOR) {
        Some((code, _)) => code.trim(),
        None => project.trim(),
    }
}

fn month_name(month_num: u32) -> &'static str {
    match month_num {
        1 => "ENERO",
        2 => "FEBRERO",
        3 => "MARZO",
        4 => "ABRIL",
        5 => "MAYO",
        6 => "JUNIO",
        7 => "JULIO",
        8 => "AGOSTO",
        9 => "SEPTIEMBRE",
        10 => "OCTUBRE",
        11 => "NOVIEMBRE",
        12 => "DICIEMBRE",
        _ => "DESCONOCIDO",
    }
}
