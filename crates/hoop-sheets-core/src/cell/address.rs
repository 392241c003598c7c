//! A1-style references

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell location, 0-based (`A1` is row 0, col 0)
///
/// `$` markers are accepted when parsing and dropped; templates never need
/// to distinguish absolute from relative references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    pub row: u32,
    /// `A` is 0
    pub col: u16,
}

impl CellAddress {
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse A1-style notation
    ///
    /// ```
    /// use hoop_sheets_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("C12").unwrap();
    /// assert_eq!((addr.row, addr.col), (11, 2));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let reference = s.trim();
        let bad = |why: &str| Error::InvalidAddress(format!("'{}': {}", reference, why));

        let unanchored = reference.strip_prefix('$').unwrap_or(reference);
        let split = unanchored
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(unanchored.len());
        let (letters, digits) = unanchored.split_at(split);
        if letters.is_empty() {
            return Err(bad("no column letters"));
        }
        let col = column_index(letters)?;

        let digits = digits.strip_prefix('$').unwrap_or(digits);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad("no row number"));
        }
        let row = match digits.parse::<u64>() {
            Ok(0) => return Err(bad("rows start at 1")),
            Ok(n) if n <= u64::from(MAX_ROWS) => (n - 1) as u32,
            Ok(n) => {
                let row = u32::try_from(n - 1).unwrap_or(u32::MAX);
                return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
            }
            Err(_) => return Err(bad("row number is too long")),
        };

        Ok(Self { row, col })
    }

    pub fn to_a1_string(&self) -> String {
        format!("{}{}", column_name(self.col), self.row + 1)
    }
}

/// Bijective base-26 letters for a 0-based column
fn column_name(col: u16) -> String {
    let mut rest = u32::from(col) + 1;
    let mut reversed = Vec::with_capacity(3);
    while rest > 0 {
        let digit = (rest - 1) % 26;
        reversed.push(char::from(b'A' + digit as u8));
        rest = (rest - 1) / 26;
    }
    reversed.into_iter().rev().collect()
}

/// Inverse of [`column_name`]; letters are case-insensitive
fn column_index(letters: &str) -> Result<u16> {
    let ordinal = letters.bytes().try_fold(0u32, |acc, b| {
        let value = acc * 26 + u32::from(b.to_ascii_uppercase() - b'A') + 1;
        if value > u32::from(MAX_COLS) {
            Err(Error::InvalidAddress(format!(
                "column '{}' is past the last column",
                letters
            )))
        } else {
            Ok(value)
        }
    })?;
    Ok((ordinal - 1) as u16)
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_name(self.col), self.row + 1)
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// An inclusive rectangle such as `A1:B10`, always stored top-left first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl CellRange {
    /// The rectangle spanned by two opposite corners, in either order
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellAddress::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    pub fn from_indices(start_row: u32, start_col: u16, end_row: u32, end_col: u16) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// Parse `A1:B2`; a lone `A1` is a one-cell range
    pub fn parse(s: &str) -> Result<Self> {
        let (first, second) = s.split_once(':').unwrap_or((s, s));
        Ok(Self::new(first.parse()?, second.parse()?))
    }

    pub fn contains(&self, row: u32, col: u16) -> bool {
        (self.start.row..=self.end.row).contains(&row)
            && (self.start.col..=self.end.col).contains(&col)
    }

    /// Covered by this range without being its top-left corner
    pub fn hides(&self, row: u32, col: u16) -> bool {
        self.contains(row, col) && CellAddress::new(row, col) != self.start
    }

    pub fn overlaps(&self, other: &CellRange) -> bool {
        let rows_meet = self.start.row <= other.end.row && other.start.row <= self.end.row;
        let cols_meet = self.start.col <= other.end.col && other.start.col <= self.end.col;
        rows_meet && cols_meet
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
