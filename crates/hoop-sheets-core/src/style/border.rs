//! Cell borders

use super::Color;

/// Lines around a cell; a `None` side has no line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BorderStyle {
    pub left: Option<BorderEdge>,
    pub right: Option<BorderEdge>,
    pub top: Option<BorderEdge>,
    pub bottom: Option<BorderEdge>,
}

impl BorderStyle {
    /// The same line on every side
    pub fn all(edge: BorderEdge) -> Self {
        Self {
            left: Some(edge),
            right: Some(edge),
            top: Some(edge),
            bottom: Some(edge),
        }
    }

    /// Left, right, top, bottom
    pub fn edges(&self) -> [Option<BorderEdge>; 4] {
        [self.left, self.right, self.top, self.bottom]
    }

    pub fn is_empty(&self) -> bool {
        self.edges().iter().all(Option::is_none)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BorderEdge {
    pub style: BorderLineStyle,
    pub color: Color,
}

impl BorderEdge {
    pub fn new(style: BorderLineStyle, color: Color) -> Self {
        Self { style, color }
    }

    /// What template header rows use: a thin automatic-color line
    pub fn thin() -> Self {
        Self::new(BorderLineStyle::Thin, Color::Auto)
    }
}

/// How a border line is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BorderLineStyle {
    Thin,
    Medium,
    Thick,
    Dashed,
    Dotted,
    Double,
    Hair,
    MediumDashed,
    DashDot,
    MediumDashDot,
    DashDotDot,
    MediumDashDotDot,
    SlantDashDot,
}

use BorderLineStyle as L;

/// `style` attribute values of a border edge
const LINE_KEYWORDS: [(BorderLineStyle, &str); 13] = [
    (L::Thin, "thin"),
    (L::Medium, "medium"),
    (L::Thick, "thick"),
    (L::Dashed, "dashed"),
    (L::Dotted, "dotted"),
    (L::Double, "double"),
    (L::Hair, "hair"),
    (L::MediumDashed, "mediumDashed"),
    (L::DashDot, "dashDot"),
    (L::MediumDashDot, "mediumDashDot"),
    (L::DashDotDot, "dashDotDot"),
    (L::MediumDashDotDot, "mediumDashDotDot"),
    (L::SlantDashDot, "slantDashDot"),
];

impl BorderLineStyle {
    pub fn as_str(&self) -> &'static str {
        LINE_KEYWORDS
            .iter()
            .find(|(line, _)| line == self)
            .map_or("thin", |(_, word)| *word)
    }

    /// `"none"` and unknown keywords give `None`
    pub fn parse(s: &str) -> Option<Self> {
        LINE_KEYWORDS
            .iter()
            .find(|(_, word)| *word == s)
            .map(|(line, _)| *line)
    }
}
