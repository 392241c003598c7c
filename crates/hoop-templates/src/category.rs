//! Age categories

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Returned when no category matches
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// An age bucket; both bounds inclusive, `max_age: None` is unbounded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDefinition {
    pub name: String,
    pub min_age: i32,
    pub max_age: Option<i32>,
}

impl CategoryDefinition {
    pub fn new(name: impl Into<String>, min_age: i32, max_age: Option<i32>) -> Self {
        Self {
            name: name.into(),
            min_age,
            max_age,
        }
    }

    pub fn contains(&self, age: i32) -> bool {
        age >= self.min_age && self.max_age.map_or(true, |max| age <= max)
    }
}

/// Name of the first category containing the player's age in `season_year`
///
/// Age is year-granular: `season_year - birth year`, month and day are
/// ignored. Gaps fall through to [`UNKNOWN_CATEGORY`], overlaps resolve to
/// the first match in list order.
pub fn classify<'a>(
    birth_date: NaiveDate,
    season_year: i32,
    categories: &'a [CategoryDefinition],
) -> &'a str {
    let age = season_year.saturating_sub(birth_date.year());
    categories
        .iter()
        .find(|c| c.contains(age))
        .map_or(UNKNOWN_CATEGORY, |c| c.name.as_str())
}

/// Year used for classification: the leading integer of the season label
///
/// `"2025-2026"` gives 2025. A label without a leading integer, or one
/// that reads as 0, falls back to `fallback`.
pub fn season_year(season_label: &str, fallback: i32) -> i32 {
    let trimmed = season_label.trim_start();
    let (sign, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    match digits[..end].parse::<i32>() {
        Ok(0) | Err(_) => fallback,
        Ok(year) => sign * year,
    }
}
