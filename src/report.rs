//! Batch entry point: every employee, every month, one failure never stops the rest.

use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use tracing::{error, info};

use crate::error::{GastosError, GastosResult};
use crate::grouping::{group_by_employee, partition_by_month};
use crate::record::ExpenseRecord;
use crate::workbook::build_or_update;

#[derive(Debug)]
pub struct EmployeeFailure {
    pub employee_name: String,
    pub error: GastosError,
}

/// Outcome of one batch run.
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Distinct files written, in the order they were first written.
    pub written: Vec<PathBuf>,
    pub failures: Vec<EmployeeFailure>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub fn generate_reports(
    records: &[ExpenseRecord],
    output_dir: &Path,
    per_diem: Decimal,
) -> GenerationReport {
    let mut report = GenerationReport::default();

    for (employee_name, employee_records) in group_by_employee(records) {
        match generate_for_employee(&employee_name, &employee_records, output_dir, per_diem) {
            Ok(paths) => {
                for path in paths {
                    if !report.written.contains(&path) {
                        report.written.push(path);
                    }
                }
            }
            Err(err) => {
                error!("Error creating/updating workbook for {}: {}", employee_name, err);
                report.failures.push(EmployeeFailure {
                    employee_name,
                    error: err,
                });
            }
        }
    }

    info!(
        "Generated {} workbook(s), {} employee(s) failed",
        report.written.len(),
        report.failures.len()
    );
    report
}

fn generate_for_employee(
    employee_name: &str,
    records: &[ExpenseRecord],
    output_dir: &Path,
    per_diem: Decimal,
) -> GastosResult<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for group in partition_by_month(employee_name, records)? {
        paths.push(build_or_update(
            &group.employee_name,
            &group.records,
            output_dir,
            per_diem,
        )?);
    }
    Ok(paths)
}
