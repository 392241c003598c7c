//! Placeholder values for one document or one player

use std::borrow::Cow;

use ahash::AHashMap;
use regex::Captures;
use serde_json::{Map, Value};

use crate::category::{classify, CategoryDefinition};
use crate::model::{GenerationContext, PlayerRecord};
use crate::options::RenderOptions;
use crate::placeholders::{self, TOKEN};

/// Token (`{{name}}`) to substituted text
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FieldMap {
    values: AHashMap<&'static str, String>,
}

impl FieldMap {
    pub fn document(context: &GenerationContext) -> Self {
        Self::from_pairs([
            ("{{seasonLabel}}", context.season_label.clone()),
            ("{{clubName}}", context.club_name.clone()),
            ("{{clubSection}}", context.club_section.clone()),
            ("{{exportDate}}", context.export_date.clone()),
        ])
    }

    /// Fields of the player at 0-based `index`
    pub fn player(
        player: &PlayerRecord,
        index: usize,
        season_year: i32,
        categories: &[CategoryDefinition],
        options: &RenderOptions,
    ) -> Self {
        Self::from_pairs([
            ("{{order}}", (index + 1).to_string()),
            ("{{playerLastName}}", player.last_name.clone()),
            ("{{playerFirstName}}", player.first_name.clone()),
            ("{{playerBirthDate}}", options.format_date(player.birth_date)),
            ("{{playerGender}}", player.gender.code().to_string()),
            ("{{playerAddress}}", player.address.clone()),
            (
                "{{playerCategory}}",
                classify(player.birth_date, season_year, categories).to_string(),
            ),
            ("{{playerPhone}}", player.phone.clone().unwrap_or_default()),
            ("{{playerEmail}}", player.email.clone().unwrap_or_default()),
        ])
    }

    fn from_pairs<const N: usize>(pairs: [(&'static str, String); N]) -> Self {
        Self {
            values: pairs.into_iter().collect(),
        }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.values.get(token).map(String::as_str)
    }

    /// JSON object keyed by placeholder name (`clubName`, not `{{clubName}}`)
    pub fn to_json(&self) -> Map<String, Value> {
        self.values
            .iter()
            .filter_map(|(token, value)| {
                let name = placeholders::lookup(token)?.name();
                Some((name.to_string(), Value::String(value.clone())))
            })
            .collect()
    }
}

/// Replace every known token in `text` in a single pass
///
/// Layers are searched in order; unknown tokens are left as written and
/// substituted values are never expanded again.
pub(crate) fn substitute<'t>(text: &'t str, layers: &[&FieldMap]) -> Cow<'t, str> {
    TOKEN.replace_all(text, |caps: &Captures<'_>| {
        let token = &caps[0];
        layers
            .iter()
            .find_map(|layer| layer.get(token))
            .unwrap_or(token)
            .to_string()
    })
}

/// Whether `text` holds any row-scope token
pub(crate) fn has_row_token(text: &str) -> bool {
    placeholders::keys_in_scope(placeholders::PlaceholderScope::Row).any(|key| text.contains(key))
}
