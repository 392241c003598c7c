//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellData, CellRange, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::style::Style;
use crate::{MAX_COLS, MAX_ROWS};

/// A single sheet of a workbook
///
/// Cells, styles and layout live in a sparse [`CellStorage`]. The sheet
/// also remembers every [`insert_rows`](Worksheet::insert_rows) call so a
/// package writer can move whatever it carries outside the model.
#[derive(Debug)]
pub struct Worksheet {
    name: String,
    cells: CellStorage,
    /// `(at, count)` in call order
    row_insertions: Vec<(u32, u32)>,
}

impl Worksheet {
    /// Create an empty worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
            row_insertions: Vec::new(),
        }
    }

    /// Tab name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the sheet
    ///
    /// Uniqueness within a workbook is checked when the sheet is added, not
    /// here.
    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = name.into();
    }

    // === Cell Access ===

    /// Value of a cell, `Empty` when absent
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    /// Style index of a cell; 0 when absent or default
    pub fn cell_style_index_at(&self, row: u32, col: u16) -> u32 {
        self.cells.get(row, col).map_or(0, |c| c.style_index)
    }

    /// The non-default style applied to a cell, if any
    pub fn cell_style_at(&self, row: u32, col: u16) -> Option<&Style> {
        match self.cell_style_index_at(row, col) {
            0 => None,
            idx => self.cells.style_pool().get(idx),
        }
    }

    /// Styles referenced by this sheet's cells; slot 0 is the default
    pub fn style_pool(&self) -> &crate::style::StylePool {
        self.cells.style_pool()
    }

    // === Cell Modification ===

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value, keeping the cell's style
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        validate_cell_position(row, col)?;
        self.cells.set_value(row, col, value.into());
        Ok(())
    }

    /// Set a cell style by address string
    pub fn set_cell_style(&mut self, address: &str, style: &Style) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_style_at(addr.row, addr.col, style)
    }

    /// Set a cell style, keeping the cell's value
    pub fn set_cell_style_at(&mut self, row: u32, col: u16, style: &Style) -> Result<()> {
        validate_cell_position(row, col)?;
        let style_index = self.cells.style_pool_mut().get_or_insert(style.clone());
        self.cells.set_style(row, col, style_index);
        Ok(())
    }

    /// Attach a style already present in this sheet's pool (used by readers)
    pub fn set_cell_style_index_at(&mut self, row: u32, col: u16, style_index: u32) -> Result<()> {
        validate_cell_position(row, col)?;
        if self.cells.style_pool().get(style_index).is_none() {
            return Err(Error::UnknownStyle(style_index));
        }
        self.cells.set_style(row, col, style_index);
        Ok(())
    }

    /// Register a style in this sheet's pool without attaching it to a cell
    pub fn intern_style(&mut self, style: Style) -> u32 {
        self.cells.style_pool_mut().get_or_insert(style)
    }

    // === Iteration ===

    /// Bounds of all stored cells
    pub fn used_range(&self) -> Option<CellRange> {
        self.cells
            .used_bounds()
            .map(|(min_row, min_col, max_row, max_col)| {
                CellRange::from_indices(min_row, min_col, max_row, max_col)
            })
    }

    /// Number of stored cells, styled blanks included
    pub fn cell_count(&self) -> usize {
        self.cells.cell_count()
    }

    /// No stored cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over all stored cells in row order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.cells.iter()
    }

    /// Iterate over the stored cells of one row
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.cells.iter_row(row)
    }

    /// Row indices holding at least one cell, ascending
    pub fn row_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.cells.row_indices()
    }

    /// Highest column index stored in `row`
    pub fn last_col_in_row(&self, row: u32) -> Option<u16> {
        self.cells.last_col_in_row(row)
    }

    // === Dimensions ===

    /// Custom height of a row in points, `None` for the default height
    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.cells.row_height(row)
    }

    /// Set a row height in points; the default height clears the override
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.cells.set_row_height(row, height);
    }

    /// Rows with a non-default height, keyed by row index
    pub fn custom_row_heights(&self) -> &BTreeMap<u32, f64> {
        self.cells.custom_row_heights()
    }

    /// Declared width of a column in characters, `None` when never set
    pub fn column_width(&self, col: u16) -> Option<f64> {
        self.cells.column_width(col)
    }

    /// Set a column width in characters
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.cells.set_column_width(col, width);
    }

    /// Every declared column width, keyed by column index
    pub fn column_widths(&self) -> &BTreeMap<u16, f64> {
        self.cells.column_widths()
    }

    // === Merged Cells ===

    /// Merged regions in the order they were added
    pub fn merged_regions(&self) -> &[CellRange] {
        self.cells.merged_regions()
    }

    /// Merge a range; fails if it overlaps an existing merged region
    pub fn merge_cells(&mut self, range: &CellRange) -> Result<()> {
        if range.end.row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(range.end.row, MAX_ROWS - 1));
        }
        if range.end.col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(range.end.col, MAX_COLS - 1));
        }
        if self
            .cells
            .merged_regions()
            .iter()
            .any(|existing| range.overlaps(existing))
        {
            return Err(Error::MergedCellConflict(range.to_string()));
        }
        self.cells.push_merged_region(*range);
        Ok(())
    }

    /// Whether `(row, col)` is covered by a merged region without being its
    /// top-left corner
    pub fn is_hidden_by_merge(&self, row: u32, col: u16) -> bool {
        self.cells.hidden_by_merge(row, col).is_some()
    }

    // === Structure ===

    /// Insert `count` blank rows before row `at`
    ///
    /// Everything at or below `at` moves down by `count` in one batch:
    /// cells, custom row heights and merged regions. A merged region that
    /// starts above `at` and ends at or below it grows by `count`.
    pub fn insert_rows(&mut self, at: u32, count: u32) -> Result<()> {
        if count == 0 {
            return Ok(());
        }

        let last_row = [
            self.cells.used_bounds().map(|(_, _, max_row, _)| max_row),
            self.cells.custom_row_heights().keys().next_back().copied(),
            self.cells.merged_regions().iter().map(|r| r.end.row).max(),
        ]
        .into_iter()
        .flatten()
        .max();

        if let Some(last_row) = last_row.filter(|&r| r >= at) {
            if last_row as u64 + count as u64 >= MAX_ROWS as u64 {
                return Err(Error::RowInsertOverflow { at, count });
            }
        }
        if at as u64 + count as u64 > MAX_ROWS as u64 {
            return Err(Error::RowInsertOverflow { at, count });
        }

        log::trace!("sheet '{}': inserting {} rows at {}", self.name, count, at);
        self.cells.shift_rows_down(at, count);
        self.row_insertions.push((at, count));
        Ok(())
    }

    /// Every successful [`insert_rows`](Self::insert_rows) as `(at, count)`,
    /// oldest first
    ///
    /// A reader leaves this empty, so after loading a template it lists
    /// exactly the rows the caller added.
    pub fn row_insertions(&self) -> &[(u32, u32)] {
        &self.row_insertions
    }
}

fn validate_cell_position(row: u32, col: u16) -> Result<()> {
    if row >= MAX_ROWS {
        return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
    }
    if col >= MAX_COLS {
        return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
    }
    Ok(())
}
