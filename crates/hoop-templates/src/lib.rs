//! # hoop-templates
//!
//! Placeholder templates for club exports.
//!
//! A template is an xlsx workbook or a docx document containing `{{name}}`
//! tokens from a closed [registry](placeholders). Document-scope tokens
//! (`{{clubName}}`, `{{seasonLabel}}`, ...) are filled once; row-scope
//! tokens (`{{playerLastName}}`, `{{order}}`, ...) are filled once per
//! player. In a workbook the first row holding a row-scope token is
//! repeated for every player, keeping its style and merges.
//!
//! - [`prepare_upload`] validates mappings or discovers the placeholders of an upload
//! - [`parse_preview`] flattens the first worksheet for a placeholder editor
//! - [`write_placeholders`] writes editor assignments into a workbook
//! - [`generate`] renders a stored template for a season's players
//! - [`classify`] picks a player's age category
//!
//! ## Example
//!
//! ```rust,no_run
//! use hoop_templates::prelude::*;
//!
//! let bytes = std::fs::read("roster.xlsx")?;
//! let prepared = prepare_upload("roster.xlsx", &bytes, None)?;
//! println!("uses {:?}", prepared.placeholders);
//!
//! let template = StoredTemplate::new("Roster", prepared.format, prepared.bytes);
//! let context = GenerationContext {
//!     season_label: "2025-2026".into(),
//!     club_name: "Hoop".into(),
//!     ..Default::default()
//! };
//! let document = generate(&template, &context, &RenderOptions::default())?;
//! std::fs::write(&document.filename, &document.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod category;
pub mod error;
pub mod generator;
pub mod mapping;
pub mod model;
pub mod options;
pub mod output;
pub mod placeholders;
pub mod prelude;
pub mod preview;
pub mod scaffold;
pub mod upload;

mod fields;

pub use category::{classify, season_year, CategoryDefinition, UNKNOWN_CATEGORY};
pub use error::{ErrorKind, TemplateError, TemplateResult};
pub use generator::{document_data, fill_workbook, generate, render_document, render_spreadsheet};
pub use mapping::{apply_mappings, mapping_tokens, validate_mappings, write_placeholders};
pub use model::{CellMapping, Gender, GenerationContext, PlayerRecord};
pub use options::RenderOptions;
pub use output::{PreparedTemplate, RenderedDocument, StoredTemplate, TemplateFormat};
pub use placeholders::{PlaceholderDefinition, PlaceholderScope, REGISTRY};
pub use preview::{
    detect_placeholder, parse_preview, preview_workbook, CellStyle, MergedRegion,
    PreviewAlignment, PreviewCell, SpreadsheetPreview, DEFAULT_COLUMN_WIDTH,
};
pub use scaffold::scaffold_template;
pub use upload::{discover_placeholders, prepare_upload, preview_template};

// Re-export the underlying engines
pub use hoop_docx::{DocxError, DocxRenderOptions};
pub use hoop_sheets_core::{Workbook, Worksheet};
pub use hoop_sheets_xlsx::{XlsxError, XlsxPackage, XlsxReader, XlsxWriter};
