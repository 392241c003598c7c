//! Sparse cell storage
//!
//! Cells live in one `BTreeMap` keyed by `(row, col)`. Tuple ordering makes
//! that row-major, so iteration always follows the sheet top to bottom.

use std::collections::BTreeMap;

use super::{CellRange, CellValue};
use crate::style::StylePool;

/// Default row height in points
pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;

/// Value plus style slot of one cell
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellData {
    pub value: CellValue,
    /// Slot in the sheet's [`StylePool`]; 0 is the default style
    pub style_index: u32,
}

impl CellData {
    pub fn new(value: CellValue) -> Self {
        Self::with_style(value, 0)
    }

    pub fn with_style(value: CellValue, style_index: u32) -> Self {
        Self { value, style_index }
    }

    /// Nothing worth storing
    pub fn is_empty(&self) -> bool {
        self.style_index == 0 && self.value.is_empty()
    }
}

type Key = (u32, u16);

/// Everything one worksheet holds besides its name
#[derive(Debug, Default)]
pub struct CellStorage {
    grid: BTreeMap<Key, CellData>,
    style_pool: StylePool,
    /// Points; only rows whose height differs from the default
    row_heights: BTreeMap<u32, f64>,
    /// Characters; only columns the template declared
    column_widths: BTreeMap<u16, f64>,
    merged_regions: Vec<CellRange>,
}

fn whole_row(row: u32) -> std::ops::RangeInclusive<Key> {
    (row, 0)..=(row, u16::MAX)
}

impl CellStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: u32, col: u16) -> Option<&CellData> {
        self.grid.get(&(row, col))
    }

    /// Store a cell; empty data clears it instead
    pub fn set(&mut self, row: u32, col: u16, data: CellData) {
        if data.is_empty() {
            self.grid.remove(&(row, col));
        } else {
            self.grid.insert((row, col), data);
        }
    }

    /// Replace the value, keeping the style slot
    pub fn set_value(&mut self, row: u32, col: u16, value: CellValue) {
        let style_index = self.get(row, col).map_or(0, |cell| cell.style_index);
        self.set(row, col, CellData::with_style(value, style_index));
    }

    /// Replace the style slot, keeping the value
    pub fn set_style(&mut self, row: u32, col: u16, style_index: u32) {
        let value = self.grid.remove(&(row, col)).unwrap_or_default().value;
        self.set(row, col, CellData::with_style(value, style_index));
    }

    pub fn cell_count(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// `(min_row, min_col, max_row, max_col)` over stored cells
    pub fn used_bounds(&self) -> Option<(u32, u16, u32, u16)> {
        let (&(first_row, _), _) = self.grid.first_key_value()?;
        let (&(last_row, _), _) = self.grid.last_key_value()?;
        let (min_col, max_col) = self
            .grid
            .keys()
            .fold((u16::MAX, 0), |(lo, hi), &(_, col)| (lo.min(col), hi.max(col)));
        Some((first_row, min_col, last_row, max_col))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.grid.iter().map(|(&(row, col), cell)| (row, col, cell))
    }

    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.grid.range(whole_row(row)).map(|(&(_, col), cell)| (col, cell))
    }

    /// Rows holding at least one cell, ascending and without repeats
    pub fn row_indices(&self) -> impl Iterator<Item = u32> + '_ {
        let mut previous = None;
        self.grid.keys().filter_map(move |&(row, _)| {
            (previous != Some(row)).then(|| {
                previous = Some(row);
                row
            })
        })
    }

    pub fn last_col_in_row(&self, row: u32) -> Option<u16> {
        self.grid
            .range(whole_row(row))
            .next_back()
            .map(|(&(_, col), _)| col)
    }

    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.row_heights.get(&row).copied()
    }

    /// A height equal to the default forgets the override
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        if (height - DEFAULT_ROW_HEIGHT).abs() < 0.001 {
            self.row_heights.remove(&row);
        } else {
            self.row_heights.insert(row, height);
        }
    }

    pub fn custom_row_heights(&self) -> &BTreeMap<u32, f64> {
        &self.row_heights
    }

    pub fn column_width(&self, col: u16) -> Option<f64> {
        self.column_widths.get(&col).copied()
    }

    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.column_widths.insert(col, width);
    }

    pub fn column_widths(&self) -> &BTreeMap<u16, f64> {
        &self.column_widths
    }

    pub fn merged_regions(&self) -> &[CellRange] {
        &self.merged_regions
    }

    pub(crate) fn push_merged_region(&mut self, range: CellRange) {
        self.merged_regions.push(range);
    }

    pub fn hidden_by_merge(&self, row: u32, col: u16) -> Option<&CellRange> {
        self.merged_regions.iter().find(|region| region.hides(row, col))
    }

    pub fn style_pool(&self) -> &StylePool {
        &self.style_pool
    }

    pub fn style_pool_mut(&mut self) -> &mut StylePool {
        &mut self.style_pool
    }

    /// Re-key every row at or below `at` to `row + count`
    ///
    /// Merged regions that start at or below `at` move; regions straddling
    /// `at` stretch. Bounds are the caller's job.
    pub(crate) fn shift_rows_down(&mut self, at: u32, count: u32) {
        let below = self.grid.split_off(&(at, 0));
        self.grid.extend(
            below
                .into_iter()
                .map(|((row, col), cell)| ((row + count, col), cell)),
        );

        let below = self.row_heights.split_off(&at);
        self.row_heights
            .extend(below.into_iter().map(|(row, height)| (row + count, height)));

        for region in &mut self.merged_regions {
            if region.end.row < at {
                continue;
            }
            if region.start.row >= at {
                region.start.row += count;
            }
            region.end.row += count;
        }
    }
}
