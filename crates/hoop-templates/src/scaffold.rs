//! Starter templates built from a list of placeholder columns

use hoop_sheets_core::{BorderEdge, BorderStyle, Style, Workbook};
use hoop_sheets_xlsx::XlsxWriter;

use crate::error::{TemplateError, TemplateResult};
use crate::placeholders;

/// Name of the single worksheet of a scaffolded template
pub const SCAFFOLD_SHEET: &str = "Template";

/// Build an xlsx template whose first row holds the given placeholders
///
/// Unknown keys are dropped. Returns the bytes and the kept keys.
pub fn scaffold_template<S: AsRef<str>>(columns: &[S]) -> TemplateResult<(Vec<u8>, Vec<String>)> {
    let kept: Vec<String> = columns
        .iter()
        .map(AsRef::as_ref)
        .filter(|key| placeholders::is_known(key))
        .map(str::to_string)
        .collect();
    if kept.is_empty() {
        return Err(TemplateError::NoValidPlaceholders);
    }

    let mut workbook = Workbook::empty();
    workbook.add_worksheet_with_name(SCAFFOLD_SHEET)?;
    let header = Style::new()
        .bold(true)
        .border(BorderStyle::all(BorderEdge::thin()));
    let sheet = workbook
        .worksheet_mut(0)
        .ok_or_else(|| TemplateError::NotFound("Workbook has no worksheets".into()))?;
    for (col, key) in kept.iter().enumerate() {
        sheet.set_cell_value_at(0, col as u16, key.as_str())?;
        sheet.set_cell_style_at(0, col as u16, &header)?;
    }

    Ok((XlsxWriter::to_bytes(&workbook)?, kept))
}
