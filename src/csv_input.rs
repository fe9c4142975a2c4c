//! CSV loading for the `nombre,proyecto,fecha` export.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::error::{GastosError, GastosResult};
use crate::record::{ExpenseRecord, parse_date};

pub const REQUIRED_COLUMNS: [&str; 3] = ["nombre", "proyecto", "fecha"];

pub fn load_records(path: &Path) -> GastosResult<Vec<ExpenseRecord>> {
    let file = File::open(path)?;
    let records = read_records(file)?;
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Reads and validates records. Extra columns are ignored.
pub fn read_records<R: Read>(input: R) -> GastosResult<Vec<ExpenseRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(GastosError::MissingColumns(missing));
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record: ExpenseRecord = row.deserialize(Some(&headers))?;
        if parse_date(&record.date).is_err() {
            return Err(GastosError::CsvDate {
                line: row.position().map(|p| p.line()).unwrap_or_default(),
                value: record.date,
            });
        }
        records.push(record);
    }

    Ok(records)
}
