//! Writing placeholder assignments into a template

use once_cell::sync::Lazy;
use regex::Regex;

use hoop_sheets_core::Workbook;
use hoop_sheets_xlsx::XlsxPackage;

use crate::error::{TemplateError, TemplateResult};
use crate::model::CellMapping;
use crate::placeholders;

/// `{{name}}` or a dotted `{{a.b}}`; dotted forms are never registry keys
static MAPPING_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(\w+(?:\.\w+)*)\}\}").expect("valid regex"));

/// Write `mappings` into the first worksheet of an xlsx template
///
/// Later mappings for the same cell win. Values are written as text;
/// styles and every other part of the package are left as they were.
pub fn write_placeholders(bytes: &[u8], mappings: &[CellMapping]) -> TemplateResult<Vec<u8>> {
    let mut package = XlsxPackage::read_bytes(bytes)?;
    apply_mappings(package.workbook_mut(), mappings)?;
    Ok(package.to_bytes()?)
}

pub fn apply_mappings(workbook: &mut Workbook, mappings: &[CellMapping]) -> TemplateResult<()> {
    let sheet = workbook
        .worksheet_mut(0)
        .ok_or_else(|| TemplateError::NotFound("Workbook has no worksheets".into()))?;
    for mapping in mappings {
        sheet.set_cell_value_at(mapping.row, mapping.col, mapping.value.as_str())?;
    }
    log::debug!("applied {} mappings to '{}'", mappings.len(), sheet.name());
    Ok(())
}

/// Every token in the mapping values, in order, duplicates kept
pub fn mapping_tokens(mappings: &[CellMapping]) -> Vec<String> {
    mappings
        .iter()
        .flat_map(|m| MAPPING_TOKEN.find_iter(&m.value))
        .map(|token| token.as_str().to_string())
        .collect()
}

/// Check every token against the registry
///
/// Returns the distinct tokens in first-seen order, or
/// [`TemplateError::InvalidPlaceholders`] listing every unknown one.
pub fn validate_mappings(mappings: &[CellMapping]) -> TemplateResult<Vec<String>> {
    let tokens = dedup(mapping_tokens(mappings));
    let invalid: Vec<String> = tokens
        .iter()
        .filter(|t| !placeholders::is_known(t))
        .cloned()
        .collect();
    if !invalid.is_empty() {
        return Err(TemplateError::InvalidPlaceholders(invalid));
    }
    Ok(tokens)
}

pub(crate) fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = ahash::AHashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
