//! Errors raised by the workbook model

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Not an A1-style reference
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Row and the last valid row
    #[error("Row {0} is past the last row ({1})")]
    RowOutOfBounds(u32, u32),

    /// Column and the last valid column
    #[error("Column {0} is past the last column ({1})")]
    ColumnOutOfBounds(u16, u16),

    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    #[error("Sheet name already exists: {0}")]
    DuplicateSheetName(String),

    #[error("Range {0} overlaps an existing merged region")]
    MergedCellConflict(String),

    #[error("Inserting {count} rows at row {at} overflows the sheet")]
    RowInsertOverflow { at: u32, count: u32 },

    /// A style index that is not in the sheet's style pool
    #[error("Unknown style index {0}")]
    UnknownStyle(u32),
}
