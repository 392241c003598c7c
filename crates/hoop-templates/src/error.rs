//! Error types for template operations

use thiserror::Error;

use hoop_docx::DocxError;
use hoop_sheets_xlsx::XlsxError;

/// Result type alias using [`TemplateError`]
pub type TemplateResult<T> = std::result::Result<T, TemplateError>;

/// Coarse classification callers map to their own status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bytes do not parse as the declared format, or the format is unsupported
    Format,
    /// A structural precondition does not hold
    NotFound,
    /// Submitted placeholders are not in the registry
    Validation,
}

/// Errors raised by the template engine
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error(transparent)]
    Spreadsheet(#[from] XlsxError),

    #[error(transparent)]
    Document(#[from] DocxError),

    /// Structural failure while editing a loaded workbook
    #[error(transparent)]
    Sheet(#[from] hoop_sheets_core::Error),

    #[error("Unsupported file format. Only .xlsx and .docx are supported.")]
    UnsupportedFormat(String),

    #[error("Only .xlsx files can be previewed")]
    PreviewUnsupported,

    #[error("{0}")]
    NotFound(String),

    /// Every offending key, deduplicated, in first-seen order
    #[error("Invalid placeholder keys: {}", .0.join(", "))]
    InvalidPlaceholders(Vec<String>),

    #[error("No valid placeholders selected")]
    NoValidPlaceholders,
}

impl TemplateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TemplateError::Spreadsheet(_)
            | TemplateError::Document(_)
            | TemplateError::Sheet(_)
            | TemplateError::UnsupportedFormat(_)
            | TemplateError::PreviewUnsupported => ErrorKind::Format,
            TemplateError::NotFound(_) => ErrorKind::NotFound,
            TemplateError::InvalidPlaceholders(_) | TemplateError::NoValidPlaceholders => {
                ErrorKind::Validation
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_messages() {
        let err = TemplateError::InvalidPlaceholders(vec!["{{a}}".into(), "{{b}}".into()]);
        assert_eq!(err.to_string(), "Invalid placeholder keys: {{a}}, {{b}}");
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = TemplateError::NotFound("Workbook has no worksheets".into());
        assert_eq!(err.to_string(), "Workbook has no worksheets");
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = TemplateError::UnsupportedFormat("notes.pdf".into());
        assert_eq!(
            err.to_string(),
            "Unsupported file format. Only .xlsx and .docx are supported."
        );
        assert_eq!(err.kind(), ErrorKind::Format);
    }
}
