//! Cell styling types
//!
//! Styles are plain values: cloning a [`Style`] never aliases another
//! cell's formatting, and a sheet stores each distinct style once in its
//! [`StylePool`].

mod alignment;
mod border;
mod color;
mod fill;
mod font;
mod number_format;
mod pool;

pub use alignment::{Alignment, HorizontalAlignment, VerticalAlignment};
pub use border::{BorderEdge, BorderLineStyle, BorderStyle};
pub use color::Color;
pub use fill::{FillPattern, FillStyle};
pub use font::FontStyle;
pub use number_format::NumberFormat;
pub use pool::StylePool;

/// Complete cell style
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub font: FontStyle,
    pub fill: FillStyle,
    pub border: BorderStyle,
    pub alignment: Alignment,
    pub number_format: NumberFormat,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.font.bold = bold;
        self
    }

    pub fn italic(mut self, italic: bool) -> Self {
        self.font.italic = italic;
        self
    }

    pub fn font_size(mut self, size: f64) -> Self {
        self.font.size = size;
        self
    }

    pub fn font_color(mut self, color: Color) -> Self {
        self.font.color = color;
        self
    }

    pub fn fill_color(mut self, color: Color) -> Self {
        self.fill = FillStyle::Solid { color };
        self
    }

    pub fn border(mut self, border: BorderStyle) -> Self {
        self.border = border;
        self
    }

    pub fn horizontal_alignment(mut self, align: HorizontalAlignment) -> Self {
        self.alignment.horizontal = align;
        self
    }

    pub fn number_format<S: Into<String>>(mut self, code: S) -> Self {
        self.number_format = NumberFormat::Custom(code.into());
        self
    }

    /// Copy of the visual attributes only: font, fill, border and alignment
    ///
    /// The number format is reset to General.
    pub fn visual_snapshot(&self) -> Style {
        Style {
            font: self.font.clone(),
            fill: self.fill,
            border: self.border,
            alignment: self.alignment,
            number_format: NumberFormat::General,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_visual_snapshot_drops_number_format() {
        let style = Style::new()
            .bold(true)
            .border(BorderStyle::all(BorderEdge::thin()))
            .number_format("dd/mm/yyyy");

        let snapshot = style.visual_snapshot();
        assert!(snapshot.font.bold);
        assert_eq!(snapshot.border, style.border);
        assert_eq!(snapshot.number_format, NumberFormat::General);
    }

    #[test]
    fn test_snapshot_is_independent_of_source() {
        let mut style = Style::new().italic(true);
        let snapshot = style.visual_snapshot();
        style.font.italic = false;

        assert!(snapshot.font.italic);
    }
}
