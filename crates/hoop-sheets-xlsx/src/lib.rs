//! # hoop-sheets-xlsx
//!
//! Reads and writes Office Open XML workbooks (`.xlsx`) to and from the
//! [`hoop_sheets_core`] model.
//!
//! What survives a round trip: cell values (cached results for formulas),
//! per-cell styles, merged regions, column widths, custom row heights and
//! the 1904 date system flag. [`XlsxWriter`] writes only those, so a
//! template read with [`XlsxReader`] loses its drawings, print setup and
//! defined names. [`XlsxPackage`] edits the model inside the original
//! package and keeps everything else.
//!
//! ```no_run
//! use hoop_sheets_xlsx::{XlsxReader, XlsxWriter};
//!
//! let mut workbook = XlsxReader::read_file("roster.xlsx")?;
//! if let Some(sheet) = workbook.worksheet_mut(0) {
//!     sheet.set_cell_value("A1", "Roster")?;
//! }
//! let bytes = XlsxWriter::to_bytes(&workbook)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod package;
pub mod reader;
pub mod writer;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use package::XlsxPackage;
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
