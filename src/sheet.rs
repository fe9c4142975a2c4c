//! In-memory worksheet content.
//!
//! Sheets are assembled here (new month) or read back into here (existing
//! months) and only turned into a real workbook when the whole file is rendered.

use std::collections::BTreeMap;

use rust_xlsxwriter::{ColNum, RowNum};

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Bool(bool),
    /// Excel serial date, written back with a date number format.
    DateTime(f64),
    /// Live formula, stored with its leading `=`.
    Formula(String),
}

impl CellValue {
    pub fn formula(text: impl AsRef<str>) -> Self {
        let text = text.as_ref();
        if text.starts_with('=') {
            CellValue::Formula(text.to_string())
        } else {
            CellValue::Formula(format!("={}", text))
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        CellValue::Number(value.into())
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(value.into())
    }
}

/// Inclusive merged block of cells, zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRange {
    pub first_row: RowNum,
    pub first_col: ColNum,
    pub last_row: RowNum,
    pub last_col: ColNum,
}

impl MergeRange {
    pub fn new(first_row: RowNum, first_col: ColNum, last_row: RowNum, last_col: ColNum) -> Self {
        Self {
            first_row,
            first_col,
            last_row,
            last_col,
        }
    }

    pub fn top_left(&self) -> (RowNum, ColNum) {
        (self.first_row, self.first_col)
    }
}

/// A named worksheet as a sparse grid of zero-based `(row, col)` cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetData {
    pub name: String,
    cells: BTreeMap<(RowNum, ColNum), CellValue>,
    merges: Vec<MergeRange>,
}

impl SheetData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
            merges: Vec::new(),
        }
    }

    /// Records a merge; a range already present is not added twice.
    pub fn merge(&mut self, range: MergeRange) {
        if !self.merges.contains(&range) {
            self.merges.push(range);
        }
    }

    pub fn merges(&self) -> &[MergeRange] {
        &self.merges
    }

    pub fn set(&mut self, row: RowNum, col: ColNum, value: impl Into<CellValue>) {
        self.cells.insert((row, col), value.into());
    }

    pub fn get(&self, row: RowNum, col: ColNum) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    pub fn text(&self, row: RowNum, col: ColNum) -> Option<&str> {
        self.get(row, col).and_then(CellValue::as_text)
    }

    pub fn cells(&self) -> impl Iterator<Item = (RowNum, ColNum, &CellValue)> {
        self.cells.iter().map(|(&(row, col), value)| (row, col, value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Replaces the sheet with the same name at its position, or appends it.
pub fn upsert_sheet(sheets: &mut Vec<SheetData>, sheet: SheetData) -> bool {
    match sheets.iter_mut().find(|s| s.name == sheet.name) {
        Some(existing) => {
            *existing = sheet;
            true
        }
        None => {
            sheets.push(sheet);
            false
        }
    }
}
