//! Workbooks

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// Characters a sheet name may not contain
const FORBIDDEN_NAME_CHARS: [char; 7] = [':', '\\', '/', '?', '*', '[', ']'];

/// Ordered worksheets plus workbook-wide settings
#[derive(Debug, Default)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
    settings: WorkbookSettings,
}

/// Settings that apply to every sheet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkbookSettings {
    /// Serial dates count from 1904-01-01 instead of 1899-12-30
    pub date_1904: bool,
}

impl Workbook {
    /// A workbook holding one empty "Sheet1"
    pub fn new() -> Self {
        let mut workbook = Self::empty();
        workbook.worksheets.push(Worksheet::new("Sheet1"));
        workbook
    }

    /// A workbook with no sheets at all, as some templates arrive
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    pub fn worksheets_mut(&mut self) -> impl Iterator<Item = &mut Worksheet> {
        self.worksheets.iter_mut()
    }

    /// Append an empty sheet; returns its index
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.add_existing_worksheet(Worksheet::new(name))
    }

    /// Append a sheet built elsewhere, e.g. by a reader
    pub fn add_existing_worksheet(&mut self, worksheet: Worksheet) -> Result<usize> {
        check_sheet_name(worksheet.name())?;
        if self.has_sheet_named(worksheet.name()) {
            return Err(Error::DuplicateSheetName(worksheet.name().to_string()));
        }
        self.worksheets.push(worksheet);
        Ok(self.worksheets.len() - 1)
    }

    pub fn settings(&self) -> &WorkbookSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut WorkbookSettings {
        &mut self.settings
    }

    /// Sheet names are unique ignoring case
    fn has_sheet_named(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.worksheets
            .iter()
            .any(|ws| ws.name().to_lowercase() == name)
    }
}

fn check_sheet_name(name: &str) -> Result<()> {
    let problem = if name.is_empty() {
        "a sheet name cannot be empty".to_string()
    } else if name.chars().count() > MAX_SHEET_NAME_LEN {
        format!("'{}' is longer than {} characters", name, MAX_SHEET_NAME_LEN)
    } else if let Some(c) = name.chars().find(|c| FORBIDDEN_NAME_CHARS.contains(c)) {
        format!("'{}' contains '{}'", name, c)
    } else {
        return Ok(());
    };
    Err(Error::InvalidSheetName(problem))
}
