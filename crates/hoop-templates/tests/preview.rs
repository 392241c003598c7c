//! Preview and placeholder writing on real packages

mod common;

use hoop_sheets_core::{CellRange, Workbook};
use hoop_templates::{
    parse_preview, write_placeholders, CellMapping, ErrorKind, TemplateError, DEFAULT_COLUMN_WIDTH,
};
use pretty_assertions::assert_eq;

use common::*;

#[test]
fn test_two_by_two_sheet() {
    let preview = parse_preview(&name_age_sheet()).unwrap();
    assert_eq!(preview.row_count, 2);
    assert_eq!(preview.col_count, 2);
    assert_eq!(preview.cells.len(), 4);
    assert_eq!(preview.cell(1, 1).unwrap().value, "30");
    assert_eq!(preview.cell(0, 0).unwrap().value, "Name");
    assert_eq!(preview.column_widths, vec![DEFAULT_COLUMN_WIDTH; 2]);
}

#[test]
fn test_written_placeholder_is_previewed() {
    let mut workbook = Workbook::new();
    let sheet = workbook.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", "Header1").unwrap();
    sheet.set_cell_value("B1", "Header2").unwrap();
    sheet.set_column_width(1, 20.0);
    let bytes = xlsx(&workbook);

    let mappings = [CellMapping::new(1, 0, "{{playerFirstName}}")];
    let preview = parse_preview(&write_placeholders(&bytes, &mappings).unwrap()).unwrap();

    let cell = preview.cell(1, 0).unwrap();
    assert_eq!(cell.value, "{{playerFirstName}}");
    assert_eq!(cell.placeholder.as_deref(), Some("{{playerFirstName}}"));
    assert_eq!(preview.cell(0, 0).unwrap().value, "Header1");
    assert_eq!(preview.cell(0, 1).unwrap().value, "Header2");
    assert_eq!(preview.column_widths, vec![DEFAULT_COLUMN_WIDTH, 140]);
}

#[test]
fn test_mapping_round_trip_leaves_other_cells() {
    let bytes = xlsx(&roster_workbook());
    let before = parse_preview(&bytes).unwrap();
    let mappings = [
        CellMapping::new(1, 3, "{{playerGender}}"),
        CellMapping::new(6, 1, "{{exportDate}}"),
    ];
    let after = parse_preview(&write_placeholders(&bytes, &mappings).unwrap()).unwrap();

    for mapping in &mappings {
        assert_eq!(after.cell(mapping.row, mapping.col).unwrap().value, mapping.value);
    }
    for cell in &before.cells {
        if mappings.iter().any(|m| (m.row, m.col) == (cell.row, cell.col)) {
            continue;
        }
        assert_eq!(after.cell(cell.row, cell.col), Some(cell));
    }
    assert_eq!(after.merged_cells, before.merged_cells);
}

#[test]
fn test_empty_mapping_list_is_a_no_op() {
    let bytes = xlsx(&roster_workbook());
    let rewritten = write_placeholders(&bytes, &[]).unwrap();
    assert_eq!(parse_preview(&rewritten).unwrap(), parse_preview(&bytes).unwrap());
}

#[test]
fn test_sheetless_workbook() {
    let bytes = sheetless_xlsx();

    let preview = parse_preview(&bytes).unwrap();
    assert!(preview.cells.is_empty());
    assert_eq!((preview.row_count, preview.col_count), (0, 0));

    let err = write_placeholders(&bytes, &[CellMapping::new(0, 0, "{{order}}")]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "Workbook has no worksheets");
}

#[test]
fn test_garbage_is_a_format_error() {
    let err = parse_preview(b"PK\x03\x04 truncated").unwrap_err();
    assert!(matches!(err, TemplateError::Spreadsheet(_)));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_merged_cells_hidden_once() {
    let bytes = xlsx(&roster_workbook());
    let preview = parse_preview(&bytes).unwrap();

    assert_eq!(preview.col_count as usize, preview.column_widths.len());
    for merge in &preview.merged_cells {
        let range = CellRange::from_indices(merge.start_row, merge.start_col, merge.end_row, merge.end_col);
        let covered: Vec<_> = preview
            .cells
            .iter()
            .filter(|c| range.contains(c.row, c.col))
            .collect();
        assert_eq!(covered.len(), 1);
        assert_eq!((covered[0].row, covered[0].col), (merge.start_row, merge.start_col));
    }

    let title = preview.cell(0, 0).unwrap();
    assert!(title.style.bold);
    assert_eq!(title.style.font_size, Some(16.0));
    assert_eq!(title.placeholder.as_deref(), Some("{{clubName}}"));
    let row = preview.cell(2, 1).unwrap();
    assert!(row.style.italic && row.style.border_bottom);
    assert_eq!(row.style.font_color.as_deref(), Some("#1F3A93"));
}
