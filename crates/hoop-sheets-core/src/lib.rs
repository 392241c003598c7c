//! # hoop-sheets-core
//!
//! The in-memory workbook model behind the hoop template engine.
//!
//! - [`CellValue`] - what a cell holds (text, number, boolean, error, formula)
//! - [`CellAddress`] and [`CellRange`] - A1-style coordinates, 0-based internally
//! - [`Style`] - value-type cell formatting, deduplicated per sheet by a [`StylePool`]
//! - [`Workbook`], [`Worksheet`] - the document structures
//!
//! ## Example
//!
//! ```rust
//! use hoop_sheets_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_cell_value("A1", "{{playerLastName}}").unwrap();
//! sheet.set_cell_value_at(0, 1, CellValue::Number(7.0)).unwrap();
//!
//! // Push everything from row 1 down by two rows.
//! sheet.insert_rows(1, 2).unwrap();
//! ```

pub mod cell;
pub mod date;
pub mod error;
pub mod style;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellData, CellError, CellRange, CellValue};
pub use error::{Error, Result};
pub use workbook::{Workbook, WorkbookSettings};
pub use worksheet::Worksheet;

pub use style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillPattern, FillStyle, FontStyle,
    HorizontalAlignment, NumberFormat, Style, StylePool, VerticalAlignment,
};

/// Maximum number of rows in a worksheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
