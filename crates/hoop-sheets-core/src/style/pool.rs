//! Per-sheet style table

use super::Style;
use ahash::AHashMap;

/// The distinct styles used on one sheet
///
/// Cells store an index into this table. Slot 0 holds the default style and
/// is never replaced.
#[derive(Debug)]
pub struct StylePool {
    styles: Vec<Style>,
    lookup: AHashMap<Style, u32>,
}

impl StylePool {
    pub fn new() -> Self {
        let mut pool = Self {
            styles: Vec::new(),
            lookup: AHashMap::new(),
        };
        pool.get_or_insert(Style::default());
        pool
    }

    /// Slot of `style`, appending it when the sheet has not used it yet
    pub fn get_or_insert(&mut self, style: Style) -> u32 {
        let styles = &mut self.styles;
        *self.lookup.entry(style).or_insert_with_key(|style| {
            styles.push(style.clone());
            (styles.len() - 1) as u32
        })
    }

    pub fn get(&self, index: u32) -> Option<&Style> {
        self.styles.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// True while only the default style is present
    pub fn is_empty(&self) -> bool {
        self.len() == 1
    }

    /// Slots in index order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Style)> {
        (0u32..).zip(&self.styles)
    }
}

impl Default for StylePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Color, FillStyle};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_starts_with_the_default_style() {
        let mut pool = StylePool::new();
        assert!(pool.is_empty());
        assert_eq!(pool.get_or_insert(Style::default()), 0);
        assert_eq!(pool.get(0), Some(&Style::default()));
    }

    #[test]
    fn test_identical_styles_share_a_slot() {
        let mut pool = StylePool::default();
        let header = pool.get_or_insert(Style::new().bold(true));
        let shaded = pool.get_or_insert(Style {
            fill: FillStyle::solid(Color::RED),
            ..Style::default()
        });

        assert_eq!(pool.get_or_insert(Style::new().bold(true)), header);
        assert_eq!((header, shaded), (1, 2));
        assert_eq!(pool.iter().map(|(i, _)| i).collect::<Vec<_>>(), [0, 1, 2]);
        assert!(pool.get(3).is_none());
    }
}
