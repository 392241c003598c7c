//! Records supplied by callers

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::category::CategoryDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Boy
    #[serde(rename = "G")]
    Male,
    /// Girl
    #[serde(rename = "F")]
    Female,
    /// Adult man
    #[serde(rename = "H")]
    ManAdult,
    /// Adult woman
    #[serde(rename = "D")]
    WomanAdult,
}

impl Gender {
    /// The one-letter code written into documents
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "G",
            Gender::Female => "F",
            Gender::ManAdult => "H",
            Gender::WomanAdult => "D",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub gender: Gender,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Everything a generation run substitutes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationContext {
    pub season_label: String,
    pub club_name: String,
    pub club_section: String,
    pub export_date: String,
    pub categories: Vec<CategoryDefinition>,
    /// In output order; `{{order}}` is the 1-based position here
    pub players: Vec<PlayerRecord>,
}

/// A value to write into a cell of the first worksheet (0-based)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellMapping {
    pub row: u32,
    pub col: u16,
    pub value: String,
}

impl CellMapping {
    pub fn new(row: u32, col: u16, value: impl Into<String>) -> Self {
        Self {
            row,
            col,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_context_from_json() {
        let context: GenerationContext = serde_json::from_str(
            r#"{
                "seasonLabel": "2025-2026",
                "clubName": "Hoop",
                "categories": [{"name": "U11", "minAge": 9, "maxAge": 10}],
                "players": [{
                    "firstName": "Ana",
                    "lastName": "Diaz",
                    "birthDate": "2015-03-02",
                    "gender": "F",
                    "address": "1 rue du Parc",
                    "phone": null
                }]
            }"#,
        )
        .unwrap();

        assert_eq!(context.club_section, "");
        assert_eq!(context.categories[0].max_age, Some(10));
        let player = &context.players[0];
        assert_eq!(player.gender, Gender::Female);
        assert_eq!(player.birth_date, NaiveDate::from_ymd_opt(2015, 3, 2).unwrap());
        assert_eq!(player.email, None);
    }
}
