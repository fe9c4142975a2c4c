//! Formatting and page setup for the expense layout.
//!
//! Formats are a pure function of the cell position, so a sheet re-rendered
//! from its content looks exactly like it did when first generated.

use rust_xlsxwriter::{ColNum, Format, FormatAlign, FormatBorder, RowNum, Worksheet, XlsxError};

use crate::layout::{
    DAY_COL, DECLARATION_ROW, DECLARATION_ROWS, FIRST_DAY_ROW, FIRST_MONEY_COL, GRAND_TOTAL_COL,
    GRAND_TOTAL_LABEL_COL, GRAND_TOTAL_ROW, HEADER_CELLS, HEADER_ROW, LAST_COL, LAST_DAY_ROW,
    LAST_MONEY_COL, TOTAL_ROW,
};

const COLUMN_WIDTHS: [f64; 8] = [8.0, 12.0, 15.0, 12.0, 8.0, 12.0, 30.0, 15.0];
const DECLARATION_ROW_HEIGHT: f64 = 30.0;
const PAPER_A4: u8 = 9;
// 1 cm in inches
const MARGIN_INCHES: f64 = 0.393701;

fn is_bold(row: RowNum, col: ColNum) -> bool {
    HEADER_CELLS.contains(&(row, col))
        || row == HEADER_ROW
        || row == TOTAL_ROW
        || (row == GRAND_TOTAL_ROW && (col == GRAND_TOTAL_LABEL_COL || col == GRAND_TOTAL_COL))
}

fn alignment(row: RowNum, col: ColNum) -> Option<FormatAlign> {
    let money_col = (FIRST_MONEY_COL..=LAST_MONEY_COL).contains(&col);
    if row == HEADER_ROW {
        Some(FormatAlign::Center)
    } else if money_col && (FIRST_DAY_ROW..=TOTAL_ROW).contains(&row) {
        Some(FormatAlign::Right)
    } else if col == DAY_COL && (FIRST_DAY_ROW..=LAST_DAY_ROW).contains(&row) {
        Some(FormatAlign::Center)
    } else {
        None
    }
}

fn has_border(row: RowNum, col: ColNum) -> bool {
    (HEADER_ROW..=TOTAL_ROW).contains(&row) && col <= LAST_COL
}

/// Format for a grid position, or `None` when the cell keeps the default style.
pub fn cell_format(row: RowNum, col: ColNum) -> Option<Format> {
    if row == DECLARATION_ROW && col == DAY_COL {
        return Some(declaration_format());
    }

    let bold = is_bold(row, col);
    let align = alignment(row, col);
    let border = has_border(row, col);
    if !bold && align.is_none() && !border {
        return None;
    }

    let mut format = Format::new();
    if bold {
        format = format.set_bold();
    }
    if let Some(align) = align {
        format = format.set_align(align);
    }
    if border {
        format = format.set_border(FormatBorder::Thin);
    }
    Some(format)
}

pub fn declaration_format() -> Format {
    Format::new()
        .set_align(FormatAlign::Justify)
        .set_align(FormatAlign::Top)
        .set_text_wrap()
}

/// Positions that carry a format even when they hold no value (the bordered table).
pub fn styled_positions() -> impl Iterator<Item = (RowNum, ColNum)> {
    (HEADER_ROW..=TOTAL_ROW).flat_map(|row| (0..=LAST_COL).map(move |col| (row, col)))
}

/// Column widths, declaration row heights and A4 print setup.
pub fn apply_page_setup(worksheet: &mut Worksheet) -> Result<(), XlsxError> {
    for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as ColNum, *width)?;
    }
    for offset in 0..DECLARATION_ROWS {
        worksheet.set_row_height(DECLARATION_ROW + offset, DECLARATION_ROW_HEIGHT)?;
    }

    worksheet.set_paper_size(PAPER_A4);
    worksheet.set_portrait();
    // 1 page wide, as many tall as needed
    worksheet.set_print_fit_to_pages(1, 0);
    worksheet.set_margins(
        MARGIN_INCHES,
        MARGIN_INCHES,
        MARGIN_INCHES,
        MARGIN_INCHES,
        0.0,
        0.0,
    );
    Ok(())
}
