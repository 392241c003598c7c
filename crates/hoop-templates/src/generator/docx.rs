//! Word-processing generation
//!
//! The docx engine does the looping; this side only builds its data.

use serde_json::Value;

use hoop_docx::DocxRenderOptions;

use super::player_fields;
use crate::error::TemplateResult;
use crate::fields::FieldMap;
use crate::model::GenerationContext;
use crate::options::RenderOptions;

/// Render a docx template
pub fn render_document(
    template: &[u8],
    context: &GenerationContext,
    options: &RenderOptions,
) -> TemplateResult<Vec<u8>> {
    let data = document_data(context, options);
    Ok(hoop_docx::render(template, &data, &DocxRenderOptions::default())?)
}

/// Document fields at the root, one record per player under `players`
pub fn document_data(context: &GenerationContext, options: &RenderOptions) -> Value {
    let mut root = FieldMap::document(context).to_json();
    let players = player_fields(context, options)
        .iter()
        .map(|fields| Value::Object(fields.to_json()))
        .collect();
    root.insert("players".to_string(), Value::Array(players));
    Value::Object(root)
}
