//! Font of a cell style

use std::hash::{Hash, Hasher};

use super::Color;

/// Font attributes; the default is 11pt Calibri in the automatic color
#[derive(Debug, Clone, PartialEq)]
pub struct FontStyle {
    pub name: String,
    /// Points
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub color: Color,
}

impl FontStyle {
    /// Everything that identifies the font, with the size as raw bits
    fn key(&self) -> (&str, u64, [bool; 4], &Color) {
        (
            &self.name,
            self.size.to_bits(),
            [self.bold, self.italic, self.underline, self.strikethrough],
            &self.color,
        )
    }
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            name: String::from("Calibri"),
            size: 11.0,
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
            color: Color::Auto,
        }
    }
}

// Styles are pooled by hash; sizes are never NaN
impl Eq for FontStyle {}

impl Hash for FontStyle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}
