//! Spreadsheet generation: document fields everywhere, template row per player

use std::borrow::Cow;

use hoop_sheets_core::{CellRange, CellValue, Style, Workbook, Worksheet};
use hoop_sheets_xlsx::XlsxPackage;

use super::player_fields;
use crate::error::TemplateResult;
use crate::fields::{has_row_token, substitute, FieldMap};
use crate::model::GenerationContext;
use crate::options::RenderOptions;

/// One column of the template row
///
/// Text is re-rendered per player; non-text cells of the template row are
/// copied into every generated row as they are.
#[derive(Debug, Clone)]
struct ColumnPattern {
    value: CellValue,
    /// Font, fill, border and alignment; `None` for unstyled cells
    style: Option<Style>,
}

impl ColumnPattern {
    fn render(&self, layers: &[&FieldMap]) -> CellValue {
        match &self.value {
            CellValue::String(text) => CellValue::String(substitute(text, layers).into_owned()),
            other => other.clone(),
        }
    }
}

/// Render an xlsx template
pub fn render_spreadsheet(
    template: &[u8],
    context: &GenerationContext,
    options: &RenderOptions,
) -> TemplateResult<Vec<u8>> {
    let mut package = XlsxPackage::read_bytes(template)?;
    fill_workbook(package.workbook_mut(), context, options)?;
    Ok(package.to_bytes()?)
}

/// Fill every worksheet of a loaded template in place
pub fn fill_workbook(
    workbook: &mut Workbook,
    context: &GenerationContext,
    options: &RenderOptions,
) -> TemplateResult<()> {
    let document = FieldMap::document(context);
    let players = player_fields(context, options);
    for sheet in workbook.worksheets_mut() {
        fill_sheet(sheet, &document, &players)?;
    }
    Ok(())
}

fn fill_sheet(sheet: &mut Worksheet, document: &FieldMap, players: &[FieldMap]) -> TemplateResult<()> {
    let template_row = substitute_document_fields(sheet, document)?;
    let (Some(row), false) = (template_row, players.is_empty()) else {
        return Ok(());
    };
    log::debug!("sheet '{}': template row {}", sheet.name(), row + 1);

    let patterns = capture_patterns(sheet, row);
    let rows: Vec<Vec<CellValue>> = players
        .iter()
        .map(|player| patterns.iter().map(|p| p.render(&[player, document])).collect())
        .collect();

    // the template row keeps its own full style
    for (col, value) in rows[0].iter().enumerate() {
        if !value.is_empty() {
            sheet.set_cell_value_at(row, col as u16, value.clone())?;
        }
    }

    let extra = rows.len() - 1;
    if extra == 0 {
        return Ok(());
    }

    let row_merges: Vec<CellRange> = sheet
        .merged_regions()
        .iter()
        .filter(|r| r.start.row == row && r.end.row == row)
        .copied()
        .collect();
    let height = sheet.row_height(row);

    sheet.insert_rows(row + 1, extra as u32)?;
    for (offset, values) in rows[1..].iter().enumerate() {
        let target = row + 1 + offset as u32;
        for (col, (pattern, value)) in patterns.iter().zip(values).enumerate() {
            let col = col as u16;
            if !value.is_empty() {
                sheet.set_cell_value_at(target, col, value.clone())?;
            }
            if let Some(style) = &pattern.style {
                sheet.set_cell_style_at(target, col, style)?;
            }
        }
        if let Some(height) = height {
            sheet.set_row_height(target, height);
        }
        for merge in &row_merges {
            sheet.merge_cells(&CellRange::from_indices(
                target,
                merge.start.col,
                target,
                merge.end.col,
            ))?;
        }
    }
    log::debug!("sheet '{}': inserted {} rows", sheet.name(), extra);
    Ok(())
}

/// Replace document tokens in every text cell; returns the first row
/// holding a row-scope token
fn substitute_document_fields(
    sheet: &mut Worksheet,
    document: &FieldMap,
) -> TemplateResult<Option<u32>> {
    let mut template_row = None;
    let mut updates = Vec::new();
    for (row, col, cell) in sheet.iter_cells() {
        let CellValue::String(text) = &cell.value else {
            continue;
        };
        if template_row.is_none() && has_row_token(text) {
            template_row = Some(row);
        }
        if let Cow::Owned(replaced) = substitute(text, &[document]) {
            if replaced != *text {
                updates.push((row, col, replaced));
            }
        }
    }
    for (row, col, text) in updates {
        sheet.set_cell_value_at(row, col, text)?;
    }
    Ok(template_row)
}

fn capture_patterns(sheet: &Worksheet, row: u32) -> Vec<ColumnPattern> {
    let Some(last_col) = sheet.last_col_in_row(row) else {
        return Vec::new();
    };
    (0..=last_col)
        .map(|col| ColumnPattern {
            value: sheet.get_value_at(row, col),
            style: sheet.cell_style_at(row, col).map(Style::visual_snapshot),
        })
        .collect()
}
