//! Common imports
//!
//! ```rust
//! use hoop_templates::prelude::*;
//! ```

pub use crate::{
    classify,
    generate,
    parse_preview,
    prepare_upload,
    preview_template,
    scaffold_template,
    write_placeholders,

    CategoryDefinition,
    CellMapping,
    Gender,
    GenerationContext,
    PlayerRecord,
    PreparedTemplate,
    RenderOptions,
    RenderedDocument,
    SpreadsheetPreview,
    StoredTemplate,
    TemplateError,
    TemplateFormat,
    TemplateResult,
};
