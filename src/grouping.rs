//! Partitioning of raw records into per-employee, per-month batches.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Datelike;

use crate::error::{GastosError, GastosResult};
use crate::record::{ExpenseRecord, MonthContext};

/// Day of month -> project code. At most one code per day; the last record wins.
pub type WorkedDays = BTreeMap<u32, String>;

/// One employee's records for one calendar month.
#[derive(Debug, Clone)]
pub struct EmployeeMonthGroup {
    pub employee_name: String,
    pub context: MonthContext,
    pub records: Vec<ExpenseRecord>,
}

impl EmployeeMonthGroup {
    pub fn worked_days(&self) -> GastosResult<WorkedDays> {
        days_worked(&self.records)
    }
}

/// Groups records by employee name, keeping the order in which each name first appears.
pub fn group_by_employee(records: &[ExpenseRecord]) -> Vec<(String, Vec<ExpenseRecord>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<ExpenseRecord>)> = Vec::new();

    for record in records {
        let slot = *index.entry(record.employee_name.as_str()).or_insert_with(|| {
            groups.push((record.employee_name.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(record.clone());
    }

    groups
}

/// Month of the first record. All records of a build call are anchored to it.
pub fn derive_month_context(records: &[ExpenseRecord]) -> GastosResult<MonthContext> {
    let first = records.first().ok_or(GastosError::EmptyInput)?;
    Ok(MonthContext::from_date(first.parsed_date()?))
}

pub fn days_worked(records: &[ExpenseRecord]) -> GastosResult<WorkedDays> {
    let mut days = WorkedDays::new();
    for record in records {
        let day = record.parsed_date()?.day();
        days.insert(day, record.project_code().to_string());
    }
    Ok(days)
}

/// Splits one employee's records into one group per distinct (year, month), first-seen order.
pub fn partition_by_month(
    employee_name: &str,
    records: &[ExpenseRecord],
) -> GastosResult<Vec<EmployeeMonthGroup>> {
    let mut groups: Vec<EmployeeMonthGroup> = Vec::new();

    for record in records {
        let date = record.parsed_date()?;
        match groups.iter_mut().find(|g| g.context.contains(date)) {
            Some(group) => group.records.push(record.clone()),
            None => groups.push(EmployeeMonthGroup {
                employee_name: employee_name.to_string(),
                context: MonthContext::from_date(date),
                records: vec![record.clone()],
            }),
        }
    }

    Ok(groups)
}

/// Record, distinct-name and distinct-project counts of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSummary {
    pub records: usize,
    pub employees: usize,
    pub projects: usize,
}

/// Projects are counted by their raw text, before the code is cut out.
pub fn summarize(records: &[ExpenseRecord]) -> InputSummary {
    let employees: HashSet<&str> = records.iter().map(|r| r.employee_name.as_str()).collect();
    let projects: HashSet<&str> = records.iter().map(|r| r.project.as_str()).collect();
    InputSummary {
        records: records.len(),
        employees: employees.len(),
        projects: projects.len(),
    }
}
