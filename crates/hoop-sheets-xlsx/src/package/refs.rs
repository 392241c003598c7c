//! Replaying row insertions onto references the model does not carry

use std::borrow::Cow;

use once_cell::sync::Lazy;
use quick_xml::events::BytesStart;
use regex::{Captures, Regex};

use crate::error::XlsxResult;
use hoop_sheets_core::MAX_ROWS;

/// Row part of an A1 reference; `$1` (whole row) matches with no letters
static ROW_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<head>\$?[A-Za-z]{0,3}\$?)(?P<row>\d+)").expect("valid regex"));

/// `Sheet!area` inside a formula, quoted sheet names included
static SHEET_AREA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?P<sheet>'(?:[^']|'')+'|[\w.]+)!",
        r"(?P<area>\$?[A-Za-z]{0,3}\$?\d*(?::\$?[A-Za-z]{0,3}\$?\d*)?)"
    ))
    .expect("valid regex")
});

/// Elements whose `ref`/`sqref` attribute points at cells of the sheet
const ANCHORED_ELEMENTS: [&[u8]; 10] = [
    b"autoFilter",
    b"comment",
    b"conditionalFormatting",
    b"dataValidation",
    b"hyperlink",
    b"ignoredError",
    b"protectedRange",
    b"sortCondition",
    b"sortState",
    b"table",
];

/// The `insert_rows` calls made on one sheet since it was read
#[derive(Debug, Clone, Default)]
pub(crate) struct RowShift {
    insertions: Vec<(u32, u32)>,
}

impl RowShift {
    pub fn new(insertions: &[(u32, u32)]) -> Self {
        Self {
            insertions: insertions.to_vec(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty()
    }

    /// Where a row of the original part ends up (0-based)
    pub fn row(&self, row: u32) -> u32 {
        self.insertions
            .iter()
            .fold(row, |row, &(at, count)| {
                if row >= at {
                    row.saturating_add(count)
                } else {
                    row
                }
            })
            .min(MAX_ROWS - 1)
    }

    /// Move every row number in a space-separated list of A1 references
    ///
    /// Each endpoint moves on its own, so a range that straddles an
    /// insertion point grows.
    pub fn references<'a>(&self, refs: &'a str) -> Cow<'a, str> {
        if self.is_empty() {
            return Cow::Borrowed(refs);
        }
        ROW_REF.replace_all(refs, |caps: &Captures<'_>| {
            match caps["row"].parse::<u32>() {
                Ok(n) if n > 0 => format!("{}{}", &caps["head"], self.row(n - 1) + 1),
                _ => caps[0].to_string(),
            }
        })
    }

    /// Rewrite `ref`/`sqref` on the elements that anchor to cells; other
    /// elements come back unchanged
    pub fn element<'a>(&self, e: &BytesStart<'a>) -> XlsxResult<Option<BytesStart<'static>>> {
        if self.is_empty() || !ANCHORED_ELEMENTS.contains(&e.local_name().as_ref()) {
            return Ok(None);
        }
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let mut shifted = BytesStart::new(name);
        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            match attr.key.as_ref() {
                b"ref" | b"sqref" => {
                    let value = attr.unescape_value()?;
                    let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                    shifted.push_attribute((key.as_str(), self.references(&value).as_ref()));
                }
                _ => shifted.push_attribute(attr),
            }
        }
        Ok(Some(shifted.into_owned()))
    }
}

/// Apply per-sheet shifts to the `Sheet!A1:B2` areas of a defined name
///
/// `shift_for` resolves an unquoted sheet name; areas on sheets it does not
/// know stay as they are.
pub(crate) fn shift_defined_name<'a, 'b>(
    formula: &'a str,
    shift_for: impl Fn(&str) -> Option<&'b RowShift>,
) -> Cow<'a, str> {
    SHEET_AREA.replace_all(formula, |caps: &Captures<'_>| {
        let raw = &caps["sheet"];
        let name = match raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
            Some(quoted) => quoted.replace("''", "'"),
            None => raw.to_string(),
        };
        match shift_for(&name) {
            Some(shift) => format!("{}!{}", raw, shift.references(&caps["area"])),
            None => caps[0].to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_rows_at_or_below_insertion_move() {
        let shift = RowShift::new(&[(3, 2), (0, 1)]);
        assert_eq!(shift.row(2), 3);
        assert_eq!(shift.row(3), 6);
        assert_eq!(shift.row(MAX_ROWS - 1), MAX_ROWS - 1);
    }

    #[test]
    fn test_reference_endpoints_move_independently() {
        let shift = RowShift::new(&[(3, 2)]);
        assert_eq!(shift.references("A1:D5"), "A1:D7");
        assert_eq!(shift.references("$B$4 C2:C3"), "$B$6 C2:C3");
        assert_eq!(shift.references("$1:$4"), "$1:$6");
        assert_eq!(shift.references("$A:$D"), "$A:$D");
        assert!(matches!(RowShift::default().references("A9"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_anchored_elements_only() {
        let shift = RowShift::new(&[(0, 1)]);
        let link = BytesStart::from_content(r#"hyperlink ref="B2" r:id="rId3""#, 9);
        let moved = shift.element(&link).unwrap().unwrap();
        assert_eq!(
            String::from_utf8_lossy(&moved),
            r#"hyperlink ref="B3" r:id="rId3""#
        );

        let pane = BytesStart::from_content(r#"pane ySplit="2" topLeftCell="A3""#, 4);
        assert!(shift.element(&pane).unwrap().is_none());
    }

    #[test]
    fn test_defined_name_areas() {
        let roster = RowShift::new(&[(3, 4)]);
        let lookup = |name: &str| (name == "Roster" || name == "Club's list").then_some(&roster);

        assert_eq!(
            shift_defined_name("Roster!$A$1:$D$6", lookup),
            "Roster!$A$1:$D$10"
        );
        assert_eq!(
            shift_defined_name("'Club''s list'!$A$5,Other!$A$5", lookup),
            "'Club''s list'!$A$9,Other!$A$5"
        );
        assert_eq!(shift_defined_name("Roster!$1:$2", lookup), "Roster!$1:$2");
    }
}
