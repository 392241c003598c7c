//! Appending cell formats to an existing styles.xml

use std::collections::HashMap;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use super::replace_attr;
use crate::error::{XlsxError, XlsxResult};
use crate::styles::{
    escape_xml, write_border, write_fill, write_font, write_xf, StyleSheet,
    FIRST_CUSTOM_NUMFMT_ID,
};
use hoop_sheets_core::style::{BorderStyle, FillStyle, FontStyle, NumberFormat, Style};

/// styleSheet children in schema order
const ORDER: [&[u8]; 11] = [
    b"numFmts",
    b"fonts",
    b"fills",
    b"borders",
    b"cellStyleXfs",
    b"cellXfs",
    b"cellStyles",
    b"dxfs",
    b"tableStyles",
    b"colors",
    b"extLst",
];

fn order_of(name: &[u8]) -> usize {
    ORDER.iter().position(|n| *n == name).unwrap_or(ORDER.len())
}

/// Styles the package already declares plus the ones a write adds
#[derive(Debug)]
pub(crate) struct StylePatch<'a> {
    existing: &'a StyleSheet,
    /// Direct children per container in the original part
    counts: HashMap<Vec<u8>, usize>,
    next_numfmt: u32,

    fonts: Vec<FontStyle>,
    fills: Vec<FillStyle>,
    borders: Vec<BorderStyle>,
    numfmts: Vec<(u32, String)>,
    xfs: Vec<String>,
    added: HashMap<Style, u32>,
}

impl<'a> StylePatch<'a> {
    pub fn new(existing: &'a StyleSheet, xml: &[u8]) -> XlsxResult<Self> {
        let next_numfmt = existing
            .numfmts
            .keys()
            .map(|id| id + 1)
            .max()
            .unwrap_or(0)
            .max(FIRST_CUSTOM_NUMFMT_ID);
        Ok(Self {
            existing,
            counts: child_counts(xml)?,
            next_numfmt,
            fonts: Vec::new(),
            fills: Vec::new(),
            borders: Vec::new(),
            numfmts: Vec::new(),
            xfs: Vec::new(),
            added: HashMap::new(),
        })
    }

    fn count(&self, container: &[u8]) -> usize {
        self.counts.get(container).copied().unwrap_or(0)
    }

    /// The xf id for a style: an existing entry that decodes to it, or a
    /// new one appended to `cellXfs`
    pub fn xf_id(&mut self, style: &Style) -> u32 {
        if let Some(id) = self.existing.xfs[..self.existing.xf_count]
            .iter()
            .position(|s| s == style)
        {
            return id as u32;
        }
        if let Some(&id) = self.added.get(style) {
            return id;
        }

        let existing = self.existing;
        let (font_count, fill_count, border_count) = (
            self.count(b"fonts"),
            self.count(b"fills"),
            self.count(b"borders"),
        );
        let font_id = component_id(&existing.fonts, font_count, &mut self.fonts, &style.font);
        let fill_id = match style.fill {
            FillStyle::None => 0,
            fill => component_id(&existing.fills, fill_count, &mut self.fills, &fill),
        };
        let border_id =
            component_id(&existing.borders, border_count, &mut self.borders, &style.border);
        let numfmt_id = match &style.number_format {
            NumberFormat::General => 0,
            NumberFormat::BuiltIn(id) => *id,
            NumberFormat::Custom(code) => self.numfmt_id(code),
        };

        let id = (self.count(b"cellXfs") + self.xfs.len()) as u32;
        self.xfs.push(write_xf(style, numfmt_id, font_id, fill_id, border_id));
        self.added.insert(style.clone(), id);
        id
    }

    fn numfmt_id(&mut self, code: &str) -> u32 {
        let declared = self.existing.numfmts.iter().map(|(id, c)| (*id, c.as_str()));
        let added = self.numfmts.iter().map(|(id, c)| (*id, c.as_str()));
        if let Some((id, _)) = declared.chain(added).find(|(_, c)| *c == code) {
            return id;
        }
        let id = self.next_numfmt;
        self.next_numfmt += 1;
        self.numfmts.push((id, code.to_string()));
        id
    }

    pub fn has_additions(&self) -> bool {
        !self.xfs.is_empty()
    }

    /// Entries to append per container
    fn additions(&self) -> Pending {
        let numfmts = self
            .numfmts
            .iter()
            .map(|(id, code)| {
                format!(
                    "<numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_xml(code)
                )
            })
            .collect();
        let additions: [(&'static [u8], Vec<String>); 5] = [
            (b"numFmts", numfmts),
            (b"fonts", self.fonts.iter().map(write_font).collect()),
            (b"fills", self.fills.iter().map(write_fill).collect()),
            (b"borders", self.borders.iter().map(write_border).collect()),
            (b"cellXfs", self.xfs.clone()),
        ];
        additions
            .into_iter()
            .filter(|(_, entries)| !entries.is_empty())
            .collect()
    }

    /// The original part with every addition spliced in and container
    /// counts updated
    pub fn apply(&self, xml: &[u8]) -> XlsxResult<Vec<u8>> {
        let mut pending = self.additions();
        let mut reader = Reader::from_reader(xml);
        let mut writer = Writer::new(Vec::with_capacity(xml.len() + 512));
        let mut depth = 0usize;
        let mut open: Option<Vec<String>> = None;

        loop {
            let (e, is_empty) = match reader.read_event()? {
                Event::Start(e) if depth == 1 => (e, false),
                Event::Empty(e) if depth == 1 => (e, true),
                Event::Start(e) => {
                    depth += 1;
                    writer.write_event(Event::Start(e))?;
                    continue;
                }
                Event::End(e) => {
                    depth = depth.saturating_sub(1);
                    match depth {
                        1 => {
                            if let Some(entries) = open.take() {
                                write_entries(&mut writer, &entries);
                            }
                        }
                        0 => flush_before(b"", &mut pending, &mut writer)?,
                        _ => {}
                    }
                    writer.write_event(Event::End(e))?;
                    continue;
                }
                Event::Eof => break,
                other => {
                    writer.write_event(other)?;
                    continue;
                }
            };

            let name = e.local_name().as_ref().to_vec();
            flush_before(&name, &mut pending, &mut writer)?;
            if !is_empty {
                depth += 1;
            }
            let Some(entries) = take(&mut pending, &name) else {
                writer.write_event(if is_empty {
                    Event::Empty(e)
                } else {
                    Event::Start(e)
                })?;
                continue;
            };

            let total = self.count(&name) + entries.len();
            writer.write_event(Event::Start(replace_attr(&e, b"count", &total.to_string())?))?;
            if is_empty {
                write_entries(&mut writer, &entries);
                let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                writer.write_event(Event::End(BytesEnd::new(tag)))?;
            } else {
                open = Some(entries);
            }
        }

        if !pending.is_empty() {
            return Err(XlsxError::InvalidFormat(
                "styles part has no styleSheet root".into(),
            ));
        }
        Ok(writer.into_inner())
    }
}

type Pending = Vec<(&'static [u8], Vec<String>)>;

/// Write every pending container that belongs before `next`, or all of
/// them when `next` is empty (the root is closing)
fn flush_before(
    next: &[u8],
    pending: &mut Pending,
    writer: &mut Writer<Vec<u8>>,
) -> XlsxResult<()> {
    let limit = if next.is_empty() {
        usize::MAX
    } else {
        order_of(next)
    };
    let (due, rest): (Pending, Pending) = pending
        .drain(..)
        .partition(|(name, _)| order_of(name) < limit && *name != next);
    *pending = rest;
    for (name, entries) in due {
        let tag = String::from_utf8_lossy(name).into_owned();
        let mut start = BytesStart::new(tag.clone());
        start.push_attribute(("count", entries.len().to_string().as_str()));
        writer.write_event(Event::Start(start))?;
        write_entries(writer, &entries);
        writer.write_event(Event::End(BytesEnd::new(tag)))?;
    }
    Ok(())
}

fn take(pending: &mut Pending, name: &[u8]) -> Option<Vec<String>> {
    let index = pending.iter().position(|(n, _)| *n == name)?;
    Some(pending.remove(index).1)
}
fn write_entries(writer: &mut Writer<Vec<u8>>, entries: &[String]) {
    for entry in entries {
        writer.get_mut().extend_from_slice(entry.as_bytes());
    }
}

/// Index of `item` among the declared entries, else among (or appended to)
/// the new ones
fn component_id<T: Clone + PartialEq>(
    declared: &[T],
    declared_count: usize,
    added: &mut Vec<T>,
    item: &T,
) -> u32 {
    if let Some(pos) = declared[..declared.len().min(declared_count)]
        .iter()
        .position(|x| x == item)
    {
        return pos as u32;
    }
    let pos = match added.iter().position(|x| x == item) {
        Some(pos) => pos,
        None => {
            added.push(item.clone());
            added.len() - 1
        }
    };
    (declared_count + pos) as u32
}

/// Direct children of each styleSheet child
fn child_counts(xml: &[u8]) -> XlsxResult<HashMap<Vec<u8>, usize>> {
    let mut reader = Reader::from_reader(xml);
    let mut counts = HashMap::new();
    let mut depth = 0usize;
    let mut container: Option<Vec<u8>> = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                match depth {
                    1 => {
                        let name = e.local_name().as_ref().to_vec();
                        counts.entry(name.clone()).or_insert(0);
                        container = Some(name);
                    }
                    2 => bump(&mut counts, &container),
                    _ => {}
                }
                depth += 1;
            }
            Event::Empty(e) => match depth {
                1 => {
                    counts.entry(e.local_name().as_ref().to_vec()).or_insert(0);
                }
                2 => bump(&mut counts, &container),
                _ => {}
            },
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 1 {
                    container = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(counts)
}

fn bump(counts: &mut HashMap<Vec<u8>, usize>, container: &Option<Vec<u8>>) {
    if let Some(name) = container {
        *counts.entry(name.clone()).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles::read_styles_xml;
    use hoop_sheets_core::style::Color;
    use pretty_assertions::assert_eq;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts>
  <fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>
  <borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
  <cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/></cellXfs>
  <cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
  <dxfs count="0"/>
</styleSheet>"#;

    #[test]
    fn test_declared_styles_are_reused() {
        let sheet = read_styles_xml(STYLES.as_bytes()).unwrap();
        let mut patch = StylePatch::new(&sheet, STYLES.as_bytes()).unwrap();
        assert_eq!(patch.xf_id(&Style::new().bold(true)), 1);
        assert_eq!(patch.xf_id(&Style::default()), 0);
        assert!(!patch.has_additions());
    }

    #[test]
    fn test_new_styles_are_appended_in_place() {
        let sheet = read_styles_xml(STYLES.as_bytes()).unwrap();
        let mut patch = StylePatch::new(&sheet, STYLES.as_bytes()).unwrap();
        let red = Style::new().bold(true).fill_color(Color::argb(0xFF, 0xFF, 0, 0));
        let dated = Style::new().number_format("dd/mm/yyyy");

        assert_eq!(patch.xf_id(&red), 2);
        assert_eq!(patch.xf_id(&dated), 3);
        assert_eq!(patch.xf_id(&red), 2);

        let xml = patch.apply(STYLES.as_bytes()).unwrap();
        let text = String::from_utf8(xml.clone()).unwrap();
        assert!(text.contains(concat!(
            r#"<numFmts count="1"><numFmt numFmtId="164" formatCode="dd/mm/yyyy"/></numFmts>"#,
            r#"<fonts count="2">"#
        )));
        assert!(text.contains(r#"<fills count="3">"#));
        assert!(text.contains(r#"<cellXfs count="4">"#));
        assert!(text.contains(r#"<cellStyle name="Normal" xfId="0" builtinId="0"/>"#));
        assert!(text.contains(r#"<dxfs count="0"/>"#));

        let back = read_styles_xml(xml.as_slice()).unwrap();
        assert_eq!(back.xf_count, 4);
        assert_eq!(back.xfs[1], Style::new().bold(true));
        assert_eq!(back.xfs[2], red);
        assert_eq!(back.xfs[3], dated);
    }
}
