//! Docx template error types

use thiserror::Error;

/// Result type for docx template operations
pub type DocxResult<T> = std::result::Result<T, DocxError>;

/// Errors raised while loading or rendering a docx template
#[derive(Debug, Error)]
pub enum DocxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// A part ended before an element that was opened in it
    #[error("Malformed XML in {0}")]
    Malformed(String),

    /// `FOR v IN ...` without a matching `END-FOR v`
    #[error("Unterminated loop: FOR {0}")]
    UnterminatedLoop(String),

    /// `END-FOR v` with no open `FOR v`
    #[error("END-FOR {0} has no matching FOR")]
    UnmatchedEndFor(String),

    /// An expression names nothing in the data or the loop bindings
    #[error("Unknown field: {0}")]
    UnknownField(String),

    /// A loop source resolved to something other than a list
    #[error("Loop source is not a list: {0}")]
    NotAList(String),

    #[error("Unsupported template command: {0}")]
    UnsupportedCommand(String),

    /// A recognised command with a malformed body (e.g. `FOR x players`)
    #[error("Invalid template command: {0}")]
    InvalidCommand(String),
}
