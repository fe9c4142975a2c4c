//! Fixed cell layout of a monthly expense sheet.
//!
//! Row/column constants are zero-based (as rust_xlsxwriter counts them);
//! formulas use the A1 references Excel shows, so row `r` here is row `r + 1`
//! in the formulas.

use rust_xlsxwriter::{ColNum, RowNum, column_number_to_name};

use crate::grouping::WorkedDays;
use crate::record::MonthContext;
use crate::sheet::{CellValue, MergeRange, SheetData};

pub const COLUMN_HEADERS: [&str; 8] = [
    "Fecha",
    "DIETAS",
    "ALOJAMIENTO",
    "GASOIL",
    "KM",
    "PEAJE",
    "OBRA",
    "FIRMA",
];

pub const DAY_COL: ColNum = 0;
pub const PER_DIEM_COL: ColNum = 1;
pub const FIRST_MONEY_COL: ColNum = 1;
pub const LAST_MONEY_COL: ColNum = 5;
pub const PROJECT_COL: ColNum = 6;
pub const LAST_COL: ColNum = 7;

pub const MONTH_ROW: RowNum = 0;
pub const NAME_ROW: RowNum = 1;
pub const HEADER_ROW: RowNum = 4;
pub const FIRST_DAY_ROW: RowNum = 5;
pub const DAYS_IN_GRID: u32 = 31;
pub const LAST_DAY_ROW: RowNum = FIRST_DAY_ROW + DAYS_IN_GRID - 1;
pub const TOTAL_ROW: RowNum = LAST_DAY_ROW + 1;
pub const GRAND_TOTAL_ROW: RowNum = TOTAL_ROW + 2;
pub const GRAND_TOTAL_LABEL_COL: ColNum = 3;
pub const GRAND_TOTAL_COL: ColNum = 4;
pub const RECEIVED_ROW: RowNum = GRAND_TOTAL_ROW + 2;
pub const SIGNED_DATE_ROW: RowNum = RECEIVED_ROW + 6;
pub const DECLARATION_ROW: RowNum = SIGNED_DATE_ROW + 2;
pub const DECLARATION_ROWS: RowNum = 4;

/// Header label/value cells: A1, C1, E1, F1 and A2, C2, E2, F2.
pub const HEADER_CELLS: [(RowNum, ColNum); 8] = [
    (MONTH_ROW, 0),
    (MONTH_ROW, 2),
    (MONTH_ROW, 4),
    (MONTH_ROW, 5),
    (NAME_ROW, 0),
    (NAME_ROW, 2),
    (NAME_ROW, 4),
    (NAME_ROW, 5),
];

/// Every day-grid DIETAS cell points here, so changing F2 reprices the month.
pub const PER_DIEM_REF: &str = "=$F$2";

pub const DECLARATION_TEXT: &str = "El trabajador declara que los días señalados en cada una de las fechas consignadas en este documento \
realizó todas y cada una de las rutas y desplazamientos, e incurrió en los gastos que se indican para \
cada una de ellas, en ejercicio de su cargo y/o actividad laboral, validando con esta firma la totalidad \
de las mismas. Y para que conste firma el presente documento en la fecha señalada.";

/// A49:H52, the block the declaration paragraph is merged across.
pub fn declaration_range() -> MergeRange {
    MergeRange::new(DECLARATION_ROW, DAY_COL, DECLARATION_ROW + DECLARATION_ROWS - 1, LAST_COL)
}

pub fn day_row(day: u32) -> RowNum {
    FIRST_DAY_ROW + day - 1
}

/// `=SUM(B6:B36)` style total for one grid column.
pub fn column_total_formula(col: ColNum) -> String {
    let name = column_number_to_name(col);
    format!("=SUM({name}{}:{name}{})", FIRST_DAY_ROW + 1, LAST_DAY_ROW + 1)
}

pub fn grand_total_formula() -> String {
    format!(
        "=SUM({}{row}:{}{row})",
        column_number_to_name(FIRST_MONEY_COL),
        column_number_to_name(LAST_MONEY_COL),
        row = TOTAL_ROW + 1
    )
}

/// Builds the complete content of one month's sheet.
pub fn build_month_sheet(
    employee_name: &str,
    context: &MonthContext,
    worked_days: &WorkedDays,
    per_diem: f64,
) -> SheetData {
    let mut sheet = SheetData::new(context.sheet_name());

    // --- Header block ---
    sheet.set(MONTH_ROW, 0, "MES");
    sheet.set(MONTH_ROW, 2, context.month_name);
    sheet.set(MONTH_ROW, 4, "AÑO");
    sheet.set(MONTH_ROW, 5, context.year);

    sheet.set(NAME_ROW, 0, "NOMBRE");
    sheet.set(NAME_ROW, 2, employee_name);
    sheet.set(NAME_ROW, 4, "VALOR");
    sheet.set(NAME_ROW, 5, per_diem);

    for (col, header) in COLUMN_HEADERS.iter().enumerate() {
        sheet.set(HEADER_ROW, col as ColNum, *header);
    }

    // --- Day grid ---
    // Always 31 rows; days a short month lacks keep their number and nothing else.
    for day in 1..=DAYS_IN_GRID {
        let row = day_row(day);
        sheet.set(row, DAY_COL, day);

        match worked_days.get(&day) {
            Some(project) => {
                sheet.set(row, PER_DIEM_COL, CellValue::formula(PER_DIEM_REF));
                for col in (PER_DIEM_COL + 1)..=LAST_MONEY_COL {
                    sheet.set(row, col, 0.0);
                }
                sheet.set(row, PROJECT_COL, project.as_str());
            }
            None => sheet.set(row, PROJECT_COL, ""),
        }
    }

    // --- Totals ---
    sheet.set(TOTAL_ROW, DAY_COL, "TOTAL");
    for col in FIRST_MONEY_COL..=LAST_MONEY_COL {
        sheet.set(TOTAL_ROW, col, CellValue::formula(column_total_formula(col)));
    }

    sheet.set(GRAND_TOTAL_ROW, GRAND_TOTAL_LABEL_COL, "Total:");
    sheet.set(GRAND_TOTAL_ROW, GRAND_TOTAL_COL, CellValue::formula(grand_total_formula()));

    // --- Footer ---
    sheet.set(RECEIVED_ROW, 0, "Recibí:");
    sheet.set(SIGNED_DATE_ROW, 0, "Fecha:");
    sheet.set(DECLARATION_ROW, DAY_COL, DECLARATION_TEXT);
    sheet.merge(declaration_range());

    sheet
}

/// True when the sheet carries this layout's landmarks (and so gets its formatting).
pub fn is_expense_sheet(sheet: &SheetData) -> bool {
    sheet.text(MONTH_ROW, 0) == Some("MES")
        && sheet.text(HEADER_ROW, DAY_COL) == Some(COLUMN_HEADERS[0])
        && sheet.text(TOTAL_ROW, DAY_COL) == Some("TOTAL")
}
