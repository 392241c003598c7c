//! Document generation
//!
//! Both paths share the same values: document fields from the context,
//! and one field map per player built up front so nothing is computed
//! while the document is being rewritten.

mod docx;
mod xlsx;

pub use docx::{document_data, render_document};
pub use xlsx::{fill_workbook, render_spreadsheet};

use crate::category::season_year;
use crate::error::TemplateResult;
use crate::fields::FieldMap;
use crate::model::GenerationContext;
use crate::options::RenderOptions;
use crate::output::{RenderedDocument, StoredTemplate, TemplateFormat};

/// Render a stored template for the given context
pub fn generate(
    template: &StoredTemplate,
    context: &GenerationContext,
    options: &RenderOptions,
) -> TemplateResult<RenderedDocument> {
    let bytes = match template.format {
        TemplateFormat::Xlsx => render_spreadsheet(&template.bytes, context, options)?,
        TemplateFormat::Docx => render_document(&template.bytes, context, options)?,
    };
    log::debug!(
        "generated '{}' ({}) for {} players",
        template.name,
        template.format,
        context.players.len()
    );
    Ok(RenderedDocument::new(template, &context.season_label, bytes))
}

/// One field map per player, in context order
fn player_fields(context: &GenerationContext, options: &RenderOptions) -> Vec<FieldMap> {
    let year = season_year(&context.season_label, options.fallback_year());
    context
        .players
        .iter()
        .enumerate()
        .map(|(index, player)| FieldMap::player(player, index, year, &context.categories, options))
        .collect()
}
