//! Generation options

use std::fmt::Write;

use chrono::{Datelike, Local, NaiveDate};
use serde::Deserialize;

/// Options for [`generate`](crate::generate)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    /// `chrono` format for `{{playerBirthDate}}` (default `%d/%m/%Y`)
    pub birth_date_format: String,

    /// Season year used when the season label has no leading year;
    /// `None` means the current local year
    pub current_year: Option<i32>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            birth_date_format: "%d/%m/%Y".to_string(),
            current_year: None,
        }
    }
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_birth_date_format(mut self, format: impl Into<String>) -> Self {
        self.birth_date_format = format.into();
        self
    }

    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    pub(crate) fn fallback_year(&self) -> i32 {
        self.current_year.unwrap_or_else(|| Local::now().year())
    }

    /// Format with `birth_date_format`, or `%d/%m/%Y` when that is invalid
    pub fn format_date(&self, date: NaiveDate) -> String {
        let mut out = String::new();
        if write!(out, "{}", date.format(&self.birth_date_format)).is_err() {
            log::debug!("invalid date format {:?}", self.birth_date_format);
            return date.format("%d/%m/%Y").to_string();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_and_partial_json() {
        let options: RenderOptions = serde_json::from_str(r#"{"currentYear": 2024}"#).unwrap();
        assert_eq!(options.birth_date_format, "%d/%m/%Y");
        assert_eq!(options.fallback_year(), 2024);

        let date = NaiveDate::from_ymd_opt(2015, 3, 2).unwrap();
        assert_eq!(options.format_date(date), "02/03/2015");
        assert_eq!(
            RenderOptions::new().with_birth_date_format("%Y-%m-%d").format_date(date),
            "2015-03-02"
        );
        assert_eq!(
            RenderOptions::new().with_birth_date_format("%Q").format_date(date),
            "02/03/2015"
        );
    }
}
