use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{Reader, Xlsx, open_workbook};
use rust_decimal::Decimal;
use tempfile::TempDir;

use gastos::{ExpenseRecord, build_or_update};

fn sheet_xml(path: &Path, index: usize) -> String {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut part = archive
        .by_name(&format!("xl/worksheets/sheet{index}.xml"))
        .unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

fn merges(path: &Path, sheet: &str) -> Vec<((u32, u32), (u32, u32))> {
    let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
    workbook
        .worksheet_merge_cells(sheet)
        .unwrap()
        .unwrap()
        .into_iter()
        .map(|d| (d.start, d.end))
        .collect()
}

fn assert_print_layout(xml: &str) {
    // A4, portrait, 1 page wide and as tall as needed
    assert!(xml.contains(r#"<pageSetup paperSize="9" fitToHeight="0" orientation="portrait"/>"#));
    assert!(xml.contains(r#"fitToPage="1""#));
    // 1 cm margins, no header/footer space
    assert!(xml.contains(
        r#"<pageMargins left="0.393701" right="0.393701" top="0.393701" bottom="0.393701" header="0" footer="0"/>"#
    ));
    assert!(xml.contains(r#"<mergeCell ref="A49:H52"/>"#));
    for row in 49..=52 {
        assert!(xml.contains(&format!(r#"<row r="{row}""#)));
    }
    assert_eq!(xml.matches(r#"ht="30""#).count(), 4);
    // widths 8 / 30 / 15 as stored by Excel (character width + padding)
    assert!(xml.contains(r#"<col min="1" max="1" width="8.71"#));
    assert!(xml.contains(r#"<col min="7" max="7" width="30.71"#));
    assert!(xml.contains(r#"<col min="8" max="8" width="15.71"#));
}

#[test]
fn test_saved_sheet_has_page_setup_and_declaration_merge() {
    let temp_dir = TempDir::new().unwrap();
    let records = vec![ExpenseRecord::new("Ana", "P1 - Site", "03/06/2024")];

    let path = build_or_update("Ana", &records, temp_dir.path(), Decimal::new(20, 0)).unwrap();

    assert_print_layout(&sheet_xml(&path, 1));
    assert_eq!(merges(&path, "JUNIO_2024"), vec![((48, 0), (51, 7))]);
}

#[test]
fn test_page_setup_and_merge_survive_adding_a_month() {
    let temp_dir = TempDir::new().unwrap();
    build_or_update(
        "Ana",
        &[ExpenseRecord::new("Ana", "P1", "03/06/2024")],
        temp_dir.path(),
        Decimal::ONE,
    )
    .unwrap();
    let path = build_or_update(
        "Ana",
        &[ExpenseRecord::new("Ana", "P2", "03/07/2024")],
        temp_dir.path(),
        Decimal::ONE,
    )
    .unwrap();

    // June was read back and re-rendered, July is new
    assert_print_layout(&sheet_xml(&path, 1));
    assert_print_layout(&sheet_xml(&path, 2));
    assert_eq!(merges(&path, "JUNIO_2024"), vec![((48, 0), (51, 7))]);
    assert_eq!(merges(&path, "JULIO_2024"), vec![((48, 0), (51, 7))]);
}
