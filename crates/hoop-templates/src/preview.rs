//! Spreadsheet preview
//!
//! A flattened, JSON-ready view of the first worksheet for the visual
//! placeholder editor.

use serde::Serialize;

use hoop_sheets_core::date::serial_to_date;
use hoop_sheets_core::{CellValue, HorizontalAlignment, Style, Workbook};
use hoop_sheets_xlsx::XlsxReader;

use crate::error::TemplateResult;
use crate::placeholders;

/// Pixel width of a column with no declared width
pub const DEFAULT_COLUMN_WIDTH: u32 = 64;

/// Pixels per character of declared column width
const PIXELS_PER_CHAR: f64 = 7.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewAlignment {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellStyle {
    pub bold: bool,
    pub italic: bool,
    pub font_size: Option<f64>,
    /// `#RRGGBB`
    pub font_color: Option<String>,
    /// `#RRGGBB`
    pub background_color: Option<String>,
    pub border_top: bool,
    pub border_bottom: bool,
    pub border_left: bool,
    pub border_right: bool,
    pub horizontal_alignment: Option<PreviewAlignment>,
}

impl From<&Style> for CellStyle {
    fn from(style: &Style) -> Self {
        let horizontal_alignment = match style.alignment.horizontal {
            HorizontalAlignment::Left => Some(PreviewAlignment::Left),
            HorizontalAlignment::Center => Some(PreviewAlignment::Center),
            HorizontalAlignment::Right => Some(PreviewAlignment::Right),
            _ => None,
        };
        Self {
            bold: style.font.bold,
            italic: style.font.italic,
            font_size: Some(style.font.size),
            font_color: style.font.color.css_hex(),
            background_color: style.fill.foreground().and_then(|c| c.css_hex()),
            border_top: style.border.top.is_some(),
            border_bottom: style.border.bottom.is_some(),
            border_left: style.border.left.is_some(),
            border_right: style.border.right.is_some(),
            horizontal_alignment,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreviewCell {
    pub row: u32,
    pub col: u16,
    pub value: String,
    pub style: CellStyle,
    /// The first registry token in `value`, if any
    pub placeholder: Option<String>,
}

/// Inclusive, 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedRegion {
    pub start_row: u32,
    pub start_col: u16,
    pub end_row: u32,
    pub end_col: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetPreview {
    pub cells: Vec<PreviewCell>,
    pub merged_cells: Vec<MergedRegion>,
    pub column_widths: Vec<u32>,
    pub row_count: u32,
    pub col_count: u32,
}

impl SpreadsheetPreview {
    pub fn cell(&self, row: u32, col: u16) -> Option<&PreviewCell> {
        self.cells.iter().find(|c| c.row == row && c.col == col)
    }
}

/// Parse xlsx bytes into a preview of the first worksheet
pub fn parse_preview(bytes: &[u8]) -> TemplateResult<SpreadsheetPreview> {
    let workbook = XlsxReader::read_bytes(bytes)?;
    Ok(preview_workbook(&workbook))
}

/// Preview of the first worksheet; an empty preview when there is none
pub fn preview_workbook(workbook: &Workbook) -> SpreadsheetPreview {
    let Some(sheet) = workbook.worksheet(0) else {
        return SpreadsheetPreview::default();
    };
    let date_1904 = workbook.settings().date_1904;

    let mut cells = Vec::new();
    let mut extent: Option<(u32, u16)> = None;
    let mut grow = |row: u32, col: u16| {
        extent = Some(match extent {
            Some((r, c)) => (r.max(row), c.max(col)),
            None => (row, col),
        });
    };

    for row in sheet.row_indices() {
        let Some(last_col) = sheet.last_col_in_row(row) else {
            continue;
        };
        grow(row, last_col);
        for col in 0..=last_col {
            if sheet.is_hidden_by_merge(row, col) {
                continue;
            }
            let style = sheet.cell_style_at(row, col);
            let value = display_value(&sheet.get_value_at(row, col), style, date_1904);
            cells.push(PreviewCell {
                row,
                col,
                placeholder: detect_placeholder(&value),
                style: style.map(CellStyle::from).unwrap_or_default(),
                value,
            });
        }
    }

    let merged_cells: Vec<MergedRegion> = sheet
        .merged_regions()
        .iter()
        .map(|range| {
            grow(range.end.row, range.end.col);
            MergedRegion {
                start_row: range.start.row,
                start_col: range.start.col,
                end_row: range.end.row,
                end_col: range.end.col,
            }
        })
        .collect();

    let Some((max_row, max_col)) = extent else {
        return SpreadsheetPreview::default();
    };

    let column_widths = (0..=max_col)
        .map(|col| {
            sheet
                .column_width(col)
                .map_or(DEFAULT_COLUMN_WIDTH, |w| (w * PIXELS_PER_CHAR).round() as u32)
        })
        .collect();

    log::debug!(
        "preview of '{}': {} cells, {} merges",
        sheet.name(),
        cells.len(),
        merged_cells.len()
    );

    SpreadsheetPreview {
        cells,
        merged_cells,
        column_widths,
        row_count: max_row + 1,
        col_count: max_col as u32 + 1,
    }
}

/// The single registry token a cell shows, if any
///
/// Only the first `{{name}}` in the text is considered; later tokens are
/// ignored even when the first is not a registry key.
pub fn detect_placeholder(text: &str) -> Option<String> {
    let token = placeholders::TOKEN.find(text)?.as_str();
    placeholders::is_known(token).then(|| token.to_string())
}

/// Text of a cell as the editor shows it
pub(crate) fn display_value(value: &CellValue, style: Option<&Style>, date_1904: bool) -> String {
    match value.effective_value() {
        CellValue::Empty => String::new(),
        CellValue::String(text) => text.clone(),
        CellValue::Number(n) => {
            let is_date = style.map_or(false, |s| s.number_format.is_date_format());
            match serial_to_date(*n, date_1904).filter(|_| is_date) {
                Some(date) => date.format("%Y-%m-%d").to_string(),
                None => format_number(*n),
            }
        }
        other => other.to_string(),
    }
}

fn format_number(n: f64) -> String {
    if n == 0.0 {
        // no "-0"
        return "0".to_string();
    }
    n.to_string()
}
