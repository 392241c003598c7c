//! The placeholder registry
//!
//! A closed catalogue of `{{name}}` tokens. Document-scope tokens are
//! substituted once per document, row-scope tokens once per player.

use ahash::AHashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// A single `{{name}}` token
pub(crate) static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\w+\}\}").expect("valid regex"));

/// When a placeholder is substituted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderScope {
    /// Once per document, from the generation context
    Document,
    /// Once per player row
    Row,
}

impl PlaceholderScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderScope::Document => "document",
            PlaceholderScope::Row => "row",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaceholderDefinition {
    /// The token, braces included
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub scope: PlaceholderScope,
}

impl PlaceholderDefinition {
    /// The key without its braces (`{{clubName}}` -> `clubName`)
    pub fn name(&self) -> &'static str {
        &self.key[2..self.key.len() - 2]
    }
}

const fn def(
    key: &'static str,
    label: &'static str,
    description: &'static str,
    scope: PlaceholderScope,
) -> PlaceholderDefinition {
    PlaceholderDefinition {
        key,
        label,
        description,
        scope,
    }
}

use PlaceholderScope::{Document, Row};

/// Every known placeholder, document scope first
pub static REGISTRY: &[PlaceholderDefinition] = &[
    def("{{seasonLabel}}", "Season", "Label of the exported season, e.g. 2025-2026", Document),
    def("{{clubName}}", "Club name", "Name of the club", Document),
    def("{{clubSection}}", "Club section", "Section or branch of the club", Document),
    def("{{exportDate}}", "Export date", "Date the document was generated", Document),
    def("{{order}}", "Order", "Position of the player in the list, starting at 1", Row),
    def("{{playerLastName}}", "Last name", "Player last name", Row),
    def("{{playerFirstName}}", "First name", "Player first name", Row),
    def("{{playerBirthDate}}", "Birth date", "Player birth date (dd/mm/yyyy)", Row),
    def("{{playerGender}}", "Gender", "Player gender code (G, F, H, D)", Row),
    def("{{playerAddress}}", "Address", "Player postal address", Row),
    def("{{playerCategory}}", "Category", "Age category for the season", Row),
    def("{{playerPhone}}", "Phone", "Player phone number, empty when unknown", Row),
    def("{{playerEmail}}", "Email", "Player email address, empty when unknown", Row),
];

static BY_KEY: Lazy<AHashMap<&'static str, &'static PlaceholderDefinition>> =
    Lazy::new(|| REGISTRY.iter().map(|d| (d.key, d)).collect());

/// All tokens in registry order
pub fn all_keys() -> Vec<&'static str> {
    REGISTRY.iter().map(|d| d.key).collect()
}

pub fn definitions_by_scope(scope: PlaceholderScope) -> Vec<&'static PlaceholderDefinition> {
    REGISTRY.iter().filter(|d| d.scope == scope).collect()
}

pub fn is_known(token: &str) -> bool {
    BY_KEY.contains_key(token)
}

pub fn lookup(token: &str) -> Option<&'static PlaceholderDefinition> {
    BY_KEY.get(token).copied()
}

/// Registry keys appearing in `text`, in order, repeats included
pub fn tokens_in(text: &str) -> impl Iterator<Item = &str> {
    TOKEN
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|token| is_known(token))
}

/// Tokens of the given scope
pub(crate) fn keys_in_scope(scope: PlaceholderScope) -> impl Iterator<Item = &'static str> {
    REGISTRY
        .iter()
        .filter(move |d| d.scope == scope)
        .map(|d| d.key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashSet;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_keys_are_unique_and_well_formed() {
        let keys = all_keys();
        let unique: AHashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());

        let shape = regex::Regex::new(r"^\{\{\w+\}\}$").unwrap();
        for def in REGISTRY {
            assert!(shape.is_match(def.key), "{}", def.key);
            assert!(!def.label.is_empty() && !def.description.is_empty());
        }
    }

    #[test]
    fn test_scopes_partition_registry() {
        let document = definitions_by_scope(PlaceholderScope::Document);
        let row = definitions_by_scope(PlaceholderScope::Row);
        assert_eq!(document.len(), 4);
        assert_eq!(document.len() + row.len(), REGISTRY.len());
        assert!(row.iter().any(|d| d.key == "{{playerCategory}}"));
    }

    #[test]
    fn test_lookup() {
        assert!(is_known("{{order}}"));
        assert!(!is_known("order"));
        assert!(!is_known("{{licenseNumber}}"));
        assert_eq!(lookup("{{clubName}}").map(|d| d.name()), Some("clubName"));
    }

    #[test]
    fn test_tokens_in() {
        let found: Vec<&str> = tokens_in("{{order}}. {{nope}} {{order}} {{a.b}}{{playerEmail}}").collect();
        assert_eq!(found, vec!["{{order}}", "{{order}}", "{{playerEmail}}"]);
    }
}
