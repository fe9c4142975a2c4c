//! Loading, merging and saving of the per-employee yearly workbooks.
//!
//! A workbook is read into a list of [`SheetData`], the month being generated is
//! built on its own and swapped into that list, and the whole file is rendered
//! to memory before it replaces the file on disk.

use std::fs;
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, Xlsx, open_workbook};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{ColNum, Format, Formula, RowNum, Workbook, Worksheet, XlsxError};
use tracing::{debug, info};

use crate::error::{GastosError, GastosResult};
use crate::grouping::{days_worked, derive_month_context};
use crate::layout::{build_month_sheet, declaration_range, is_expense_sheet};
use crate::record::{ExpenseRecord, MonthContext};
use crate::sheet::{CellValue, MergeRange, SheetData, upsert_sheet};
use crate::style::{apply_page_setup, cell_format, declaration_format, styled_positions};

const DATE_NUM_FORMAT: &str = "dd/mm/yyyy";

/// `JUAN_PEREZ_GASTOS_2024.xlsx` for employee "Juan Perez" and year 2024.
pub fn workbook_file_name(employee_name: &str, year: i32) -> String {
    format!("{}_GASTOS_{}.xlsx", employee_name.to_uppercase().replace(' ', "_"), year)
}

pub fn workbook_path(output_dir: &Path, employee_name: &str, year: i32) -> PathBuf {
    output_dir.join(workbook_file_name(employee_name, year))
}

/// Creates or updates the employee's workbook with the sheet for the records' month.
///
/// Every record must fall in the month of the first one. The previous file is
/// only replaced once the new workbook has been fully rendered.
pub fn build_or_update(
    employee_name: &str,
    records: &[ExpenseRecord],
    output_dir: &Path,
    per_diem: Decimal,
) -> GastosResult<PathBuf> {
    let context = derive_month_context(records)?;
    ensure_single_month(employee_name, records, &context)?;

    if per_diem.is_sign_negative() {
        return Err(GastosError::InvalidAmount(per_diem.to_string()));
    }
    let per_diem_value = per_diem
        .to_f64()
        .ok_or_else(|| GastosError::InvalidAmount(per_diem.to_string()))?;

    let employee_name = employee_name.to_uppercase();
    fs::create_dir_all(output_dir)?;
    let path = workbook_path(output_dir, &employee_name, context.year);

    let mut sheets = if path.exists() {
        info!("Existing workbook found for {}, adding sheet: {}", employee_name, path.display());
        load_sheets(&path)?
    } else {
        info!("Creating new workbook for {}: {}", employee_name, path.display());
        Vec::new()
    };

    let worked_days = days_worked(records)?;
    let month_sheet = build_month_sheet(&employee_name, &context, &worked_days, per_diem_value);
    debug!(
        "Built sheet {} with {} worked days",
        month_sheet.name,
        worked_days.len()
    );

    if upsert_sheet(&mut sheets, month_sheet) {
        info!("Sheet {} already existed, replaced", context.sheet_name());
    }

    save_sheets(&sheets, &path)?;
    info!("Workbook saved: {}", path.display());

    Ok(fs::canonicalize(&path)?)
}

fn ensure_single_month(
    employee_name: &str,
    records: &[ExpenseRecord],
    context: &MonthContext,
) -> GastosResult<()> {
    for record in records {
        let date = record.parsed_date()?;
        if !context.contains(date) {
            return Err(GastosError::MixedMonths {
                employee: employee_name.to_string(),
                expected: context.sheet_name(),
                found: MonthContext::from_date(date).sheet_name(),
            });
        }
    }
    Ok(())
}

// --- Reading existing workbooks ---

/// Reads every sheet of an existing workbook, in workbook order: values, live
/// formulas, dates and merged ranges.
pub fn load_sheets(path: &Path) -> GastosResult<Vec<SheetData>> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e| GastosError::format(path, e))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let values = workbook
            .worksheet_range(&name)
            .map_err(|e| GastosError::format(path, e))?;
        let formulas = workbook
            .worksheet_formula(&name)
            .map_err(|e| GastosError::format(path, e))?;
        let merges = match workbook.worksheet_merge_cells(&name) {
            Some(merges) => merges.map_err(|e| GastosError::format(path, e))?,
            None => Vec::new(),
        };

        let mut sheet = SheetData::new(name.as_str());

        let (first_row, first_col) = values.start().unwrap_or((0, 0));
        for (row, col, value) in values.used_cells() {
            if let Some(cell) = data_to_cell(value) {
                sheet.set(first_row + row as RowNum, (first_col as usize + col) as ColNum, cell);
            }
        }

        let (first_row, first_col) = formulas.start().unwrap_or((0, 0));
        for (row, col, formula) in formulas.used_cells() {
            sheet.set(
                first_row + row as RowNum,
                (first_col as usize + col) as ColNum,
                CellValue::formula(formula),
            );
        }

        for dimensions in merges {
            let (first_row, first_col) = dimensions.start;
            let (last_row, last_col) = dimensions.end;
            sheet.merge(MergeRange::new(
                first_row,
                first_col as ColNum,
                last_row,
                last_col as ColNum,
            ));
        }

        debug!(
            "Loaded sheet {} ({} cells, {} merges)",
            name,
            sheet.len(),
            sheet.merges().len()
        );
        sheets.push(sheet);
    }

    Ok(sheets)
}

fn data_to_cell(value: &Data) -> Option<CellValue> {
    match value {
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::DateTime(dt) => Some(CellValue::DateTime(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        Data::Error(_) | Data::Empty => None,
    }
}

// --- Rendering and saving ---

/// Renders one sheet. Sheets with the expense layout get its formatting back.
pub fn render_sheet(sheet: &SheetData) -> Result<Worksheet, XlsxError> {
    let mut worksheet = Worksheet::new();
    worksheet.set_name(&sheet.name)?;

    let styled = is_expense_sheet(sheet);
    if styled {
        for (row, col) in styled_positions() {
            if sheet.get(row, col).is_none() {
                if let Some(format) = cell_format(row, col) {
                    worksheet.write_blank(row, col, &format)?;
                }
            }
        }
    }

    // Merges go first; a merged block's text is written by merge_range itself,
    // any other value is written into its top-left cell afterwards.
    let mut merged_text: Vec<(RowNum, ColNum)> = Vec::new();
    let mut merge_formats: Vec<((RowNum, ColNum), Format)> = Vec::new();
    let mut merges = sheet.merges().to_vec();
    if styled && !merges.contains(&declaration_range()) {
        merges.push(declaration_range());
    }
    for range in &merges {
        if range.first_row == range.last_row && range.first_col == range.last_col {
            continue;
        }
        let (row, col) = range.top_left();
        let format = if styled && *range == declaration_range() {
            declaration_format()
        } else {
            let base = if styled { cell_format(row, col) } else { None };
            base.unwrap_or_else(Format::new)
        };
        let text = sheet.text(row, col).unwrap_or_default();
        worksheet.merge_range(
            range.first_row,
            range.first_col,
            range.last_row,
            range.last_col,
            text,
            &format,
        )?;
        if sheet.text(row, col).is_some() {
            merged_text.push((row, col));
        }
        merge_formats.push(((row, col), format));
    }

    for (row, col, value) in sheet.cells() {
        if merged_text.contains(&(row, col)) {
            continue;
        }
        let format = match merge_formats.iter().find(|(pos, _)| *pos == (row, col)) {
            Some((_, format)) => Some(format.clone()),
            None if styled => cell_format(row, col),
            None => None,
        };
        write_cell(&mut worksheet, row, col, value, format.as_ref())?;
    }

    if styled {
        apply_page_setup(&mut worksheet)?;
    }

    Ok(worksheet)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: RowNum,
    col: ColNum,
    value: &CellValue,
    format: Option<&Format>,
) -> Result<(), XlsxError> {
    match (value, format) {
        (CellValue::Text(text), Some(format)) if text.is_empty() => {
            worksheet.write_blank(row, col, format)?;
        }
        (CellValue::Text(text), None) if text.is_empty() => {}
        (CellValue::Text(text), Some(format)) => {
            worksheet.write_string_with_format(row, col, text, format)?;
        }
        (CellValue::Text(text), None) => {
            worksheet.write_string(row, col, text)?;
        }
        (CellValue::Number(number), Some(format)) => {
            worksheet.write_number_with_format(row, col, *number, format)?;
        }
        (CellValue::Number(number), None) => {
            worksheet.write_number(row, col, *number)?;
        }
        (CellValue::DateTime(serial), format) => {
            let format = format
                .cloned()
                .unwrap_or_else(Format::new)
                .set_num_format(DATE_NUM_FORMAT);
            worksheet.write_number_with_format(row, col, *serial, &format)?;
        }
        (CellValue::Bool(flag), Some(format)) => {
            worksheet.write_boolean_with_format(row, col, *flag, format)?;
        }
        (CellValue::Bool(flag), None) => {
            worksheet.write_boolean(row, col, *flag)?;
        }
        (CellValue::Formula(formula), Some(format)) => {
            worksheet.write_formula_with_format(row, col, Formula::new(formula), format)?;
        }
        (CellValue::Formula(formula), None) => {
            worksheet.write_formula(row, col, Formula::new(formula))?;
        }
    }
    Ok(())
}

/// Writes all sheets to `path` through a temporary sibling file and a rename.
pub fn save_sheets(sheets: &[SheetData], path: &Path) -> GastosResult<()> {
    let mut workbook = Workbook::new();
    for sheet in sheets {
        let worksheet = render_sheet(sheet).map_err(|e| GastosError::format(path, e))?;
        workbook.push_worksheet(worksheet);
    }
    let buffer = workbook
        .save_to_buffer()
        .map_err(|e| GastosError::format(path, e))?;

    let temp_path = path.with_extension("xlsx.tmp");
    if let Err(e) = fs::write(&temp_path, &buffer) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn rec(date: &str) -> ExpenseRecord {
        ExpenseRecord::new("Ana Maria", "P1 - Site", date)
    }

    #[test]
    fn test_workbook_file_name() {
        assert_eq!(workbook_file_name("Ana", 2024), "ANA_GASTOS_2024.xlsx");
        assert_eq!(workbook_file_name("juan de la cruz", 2025), "JUAN_DE_LA_CRUZ_GASTOS_2025.xlsx");
    }

    #[test]
    fn test_build_creates_directory_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("nested").join("out");

        let path = build_or_update("Ana Maria", &[rec("03/06/2024")], &out, Decimal::new(2000, 2)).unwrap();

        assert!(path.is_absolute());
        assert!(path.ends_with("ANA_MARIA_GASTOS_2024.xlsx"));
        assert!(path.exists());
        assert!(!out.join("ANA_MARIA_GASTOS_2024.xlsx.tmp").exists());
    }

    #[test]
    fn test_build_rejects_empty_input() {
        let temp_dir = TempDir::new().unwrap();
        let err = build_or_update("Ana", &[], temp_dir.path(), Decimal::ZERO).unwrap_err();
        assert!(matches!(err, GastosError::EmptyInput));
    }

    #[test]
    fn test_build_rejects_mixed_months() {
        let temp_dir = TempDir::new().unwrap();
        let records = vec![rec("30/06/2024"), rec("01/07/2024")];
        let err = build_or_update("Ana", &records, temp_dir.path(), Decimal::ZERO).unwrap_err();
        match err {
            GastosError::MixedMonths { expected, found, .. } => {
                assert_eq!(expected, "JUNIO_2024");
                assert_eq!(found, "JULIO_2024");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!temp_dir.path().join("ANA_GASTOS_2024.xlsx").exists());
    }

    #[test]
    fn test_build_rejects_negative_per_diem() {
        let temp_dir = TempDir::new().unwrap();
        let err = build_or_update("Ana", &[rec("01/06/2024")], temp_dir.path(), Decimal::new(-5, 0))
            .unwrap_err();
        assert!(matches!(err, GastosError::InvalidAmount(_)));
    }

    #[test]
    fn test_corrupt_existing_file_is_format_error_and_left_alone() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ANA_GASTOS_2024.xlsx");
        fs::write(&path, b"not a spreadsheet").unwrap();

        let err = build_or_update("Ana", &[rec("01/06/2024")], temp_dir.path(), Decimal::ZERO).unwrap_err();

        assert!(matches!(err, GastosError::Format { .. }));
        assert_eq!(fs::read(&path).unwrap(), b"not a spreadsheet");
    }

    #[test]
    fn test_load_reads_back_formulas_and_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = build_or_update("Ana", &[rec("03/06/2024")], temp_dir.path(), Decimal::new(20, 0)).unwrap();

        let sheets = load_sheets(&path).unwrap();
        assert_eq!(sheets.len(), 1);
        let sheet = &sheets[0];
        assert_eq!(sheet.name, "JUNIO_2024");
        assert!(is_expense_sheet(sheet));
        assert_eq!(sheet.get(7, 1), Some(&CellValue::Formula("=$F$2".into())));
        assert_eq!(sheet.get(1, 5), Some(&CellValue::Number(20.0)));
        assert_eq!(sheet.text(7, 6), Some("P1"));
        assert_eq!(sheet.merges(), &[declaration_range()]);
    }

    #[test]
    fn test_foreign_sheet_rendered_without_layout() {
        let mut notes = SheetData::new("Notas");
        notes.set(0, 0, "kilometraje");
        notes.set(0, 1, 12.5);
        notes.set(1, 1, CellValue::formula("B1*2"));
        notes.set(2, 0, CellValue::Bool(true));
        notes.set(3, 0, CellValue::DateTime(45446.0));
        notes.set(4, 0, 7.0);
        notes.merge(MergeRange::new(4, 0, 4, 3));

        assert!(render_sheet(&notes).is_ok());
    }
}
