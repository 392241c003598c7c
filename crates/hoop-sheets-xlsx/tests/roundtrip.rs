//! Write a workbook, read it back, compare what templates rely on

use hoop_sheets_core::{
    BorderEdge, BorderStyle, CellRange, CellValue, Color, HorizontalAlignment, Style, Workbook,
};
use hoop_sheets_xlsx::{XlsxReader, XlsxWriter};
use pretty_assertions::assert_eq;

fn roster_template() -> Workbook {
    let mut workbook = Workbook::new();
    let sheet = workbook.worksheet_mut(0).unwrap();
    sheet.set_name("Roster");

    let header = Style::new()
        .bold(true)
        .font_size(14.0)
        .fill_color(Color::rgb(0xCC, 0xE5, 0xFF))
        .border(BorderStyle::all(BorderEdge::thin()))
        .horizontal_alignment(HorizontalAlignment::Center);

    sheet.set_cell_value("A1", "{{clubName}} - {{seasonLabel}}").unwrap();
    sheet.set_cell_style("A1", &header).unwrap();
    sheet.merge_cells(&CellRange::parse("A1:C1").unwrap()).unwrap();
    sheet.set_cell_value("A3", "{{playerLastName}}").unwrap();
    sheet.set_cell_value("B3", "{{playerBirthDate}}").unwrap();
    sheet.set_cell_value("C3", 12).unwrap();
    sheet.set_row_height(2, 22.5);
    sheet.set_column_width(0, 25.0);
    workbook
}

#[test]
fn test_values_styles_and_layout_survive() {
    let bytes = XlsxWriter::to_bytes(&roster_template()).unwrap();
    let workbook = XlsxReader::read_bytes(&bytes).unwrap();

    assert_eq!(workbook.sheet_count(), 1);
    let sheet = workbook.worksheet(0).unwrap();
    assert_eq!(sheet.name(), "Roster");
    assert_eq!(
        sheet.get_value_at(0, 0),
        CellValue::string("{{clubName}} - {{seasonLabel}}")
    );
    assert_eq!(sheet.get_value_at(2, 2), CellValue::Number(12.0));

    let style = sheet.cell_style_at(0, 0).unwrap();
    assert!(style.font.bold);
    assert_eq!(style.font.size, 14.0);
    assert_eq!(style.fill.foreground().and_then(|c| c.css_hex()), Some("#CCE5FF".into()));
    assert_eq!(style.border, BorderStyle::all(BorderEdge::thin()));
    assert_eq!(style.alignment.horizontal, HorizontalAlignment::Center);
    assert!(sheet.cell_style_at(2, 0).is_none());

    assert_eq!(sheet.merged_regions(), &[CellRange::parse("A1:C1").unwrap()]);
    assert_eq!(sheet.row_height(2), Some(22.5));
    assert_eq!(sheet.column_width(0), Some(25.0));
}

#[test]
fn test_inserted_rows_are_written_in_order() {
    let mut workbook = roster_template();
    let sheet = workbook.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A4", "footer").unwrap();
    sheet.insert_rows(3, 2).unwrap();
    sheet.set_cell_value_at(3, 0, "second").unwrap();
    sheet.set_cell_value_at(4, 0, "third").unwrap();

    let bytes = XlsxWriter::to_bytes(&workbook).unwrap();
    let sheet_back = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet_back = sheet_back.worksheet(0).unwrap();

    let column_a: Vec<String> = (2..6)
        .map(|row| sheet_back.get_value_at(row, 0).to_string())
        .collect();
    assert_eq!(
        column_a,
        vec!["{{playerLastName}}", "second", "third", "footer"]
    );
}

#[test]
fn test_date_system_and_file_round_trip() {
    let mut workbook = roster_template();
    workbook.settings_mut().date_1904 = true;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("roster.xlsx");
    XlsxWriter::write_file(&workbook, &path).unwrap();

    let back = XlsxReader::read_file(&path).unwrap();
    assert!(back.settings().date_1904);
    assert_eq!(back.worksheet(0).unwrap().cell_count(), 4);
}

#[test]
fn test_text_whitespace_and_newlines_preserved() {
    let mut workbook = Workbook::new();
    let sheet = workbook.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", "  padded  ").unwrap();
    sheet.set_cell_value("A2", "two\nlines").unwrap();

    let bytes = XlsxWriter::to_bytes(&workbook).unwrap();
    let back = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet = back.worksheet(0).unwrap();
    assert_eq!(sheet.get_value_at(0, 0), CellValue::string("  padded  "));
    assert_eq!(sheet.get_value_at(1, 0), CellValue::string("two\nlines"));
}

#[test]
fn test_markup_control_characters_and_literal_escapes_survive() {
    let mut workbook = Workbook::new();
    let sheet = workbook.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", "O'Neil & <Co> \u{1}").unwrap();
    sheet.set_cell_value("A2", "_x0041_ stays literal").unwrap();
    sheet.set_cell_value("A3", "tab\there").unwrap();

    let bytes = XlsxWriter::to_bytes(&workbook).unwrap();
    let back = XlsxReader::read_bytes(&bytes).unwrap();
    let sheet = back.worksheet(0).unwrap();
    assert_eq!(sheet.get_value_at(0, 0), CellValue::string("O'Neil & <Co> \u{1}"));
    assert_eq!(sheet.get_value_at(1, 0), CellValue::string("_x0041_ stays literal"));
    assert_eq!(sheet.get_value_at(2, 0), CellValue::string("tab\there"));
}
