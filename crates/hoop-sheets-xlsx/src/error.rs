//! Errors raised while reading or writing a spreadsheet package

use thiserror::Error;

pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

#[derive(Debug, Error)]
pub enum XlsxError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// Not a readable ZIP archive
    #[error("Not a valid package: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A ZIP archive, but not a spreadsheet
    #[error("Invalid xlsx package: {0}")]
    InvalidFormat(String),

    #[error("Package has no {0} part")]
    MissingPart(String),

    /// Well-formed XML holding a value that cannot be interpreted
    #[error("{0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] hoop_sheets_core::Error),
}
