//! Worksheet parts rewritten around a regenerated `<sheetData>`

use std::collections::{BTreeMap, HashMap};

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use super::refs::RowShift;
use super::replace_attr;
use crate::error::{XlsxError, XlsxResult};
use crate::styles::escape_xml;
use crate::writer::{cols_xml, merge_cells_xml, sheet_data_xml};
use hoop_sheets_core::Worksheet;

/// worksheet children that come after `<mergeCells>`
const AFTER_MERGE_CELLS: [&[u8]; 24] = [
    b"phoneticPr",
    b"conditionalFormatting",
    b"dataValidations",
    b"hyperlinks",
    b"printOptions",
    b"pageMargins",
    b"pageSetup",
    b"headerFooter",
    b"rowBreaks",
    b"colBreaks",
    b"customProperties",
    b"cellWatches",
    b"ignoredErrors",
    b"smartTags",
    b"drawing",
    b"legacyDrawing",
    b"legacyDrawingHF",
    b"drawingHF",
    b"picture",
    b"oleObjects",
    b"controls",
    b"webPublishItems",
    b"tableParts",
    b"extLst",
];

/// `<row>` attributes the model regenerates
const MODELED_ROW_ATTRS: [&[u8]; 4] = [b"r", b"spans", b"ht", b"customHeight"];

/// How one worksheet part gets rewritten
pub(crate) struct SheetRewrite<'a> {
    pub sheet: &'a Worksheet,
    /// Local style slot -> xf id
    pub xfs: &'a HashMap<u32, u32>,
    pub shift: &'a RowShift,
    /// Regenerate `<cols>` from the model instead of copying it
    pub widths_changed: bool,
}

/// Streaming state while copying the part
#[derive(Default)]
struct Progress {
    depth: usize,
    /// Top-level element whose original content is being dropped
    skipping: Option<Vec<u8>>,
    /// Original row -> attributes the model does not carry
    row_attrs: BTreeMap<u32, String>,
    next_row: u32,
    cols_done: bool,
    merges_done: bool,
}

impl SheetRewrite<'_> {
    pub fn apply(&self, xml: &[u8]) -> XlsxResult<Vec<u8>> {
        let mut reader = Reader::from_reader(xml);
        let mut writer = Writer::new(Vec::with_capacity(xml.len()));
        let mut state = Progress::default();

        loop {
            let event = reader.read_event()?;
            if state.skipping.is_some() {
                match event {
                    Event::Start(e) => {
                        if state.depth == 2 && e.local_name().as_ref() == b"row" {
                            state.keep_row_attrs(&e)?;
                        }
                        state.depth += 1;
                    }
                    Event::Empty(e) if state.depth == 2 && e.local_name().as_ref() == b"row" => {
                        state.keep_row_attrs(&e)?;
                    }
                    Event::End(_) => {
                        state.depth -= 1;
                        if state.depth == 1 {
                            let done = state.skipping.take();
                            if done.as_deref() == Some(&b"sheetData"[..]) {
                                self.push_sheet_data(&mut writer, &state.row_attrs);
                            }
                        }
                    }
                    Event::Eof => return Err(unexpected_end()),
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(e) if state.depth == 1 => {
                    self.top_level(e, false, &mut state, &mut writer)?
                }
                Event::Empty(e) if state.depth == 1 => {
                    self.top_level(e, true, &mut state, &mut writer)?
                }
                Event::Start(e) => {
                    state.depth += 1;
                    match self.shift.element(&e)? {
                        Some(moved) => writer.write_event(Event::Start(moved))?,
                        None => writer.write_event(Event::Start(e))?,
                    }
                }
                Event::Empty(e) => match self.shift.element(&e)? {
                    Some(moved) => writer.write_event(Event::Empty(moved))?,
                    None => writer.write_event(Event::Empty(e))?,
                },
                Event::End(e) => {
                    state.depth = state.depth.saturating_sub(1);
                    if state.depth == 0 && !state.merges_done {
                        state.merges_done = true;
                        push(&mut writer, merge_cells_xml(self.sheet));
                    }
                    writer.write_event(Event::End(e))?;
                }
                Event::Eof => break,
                other => writer.write_event(other)?,
            }
        }

        Ok(writer.into_inner())
    }

    /// A direct child of `<worksheet>`
    fn top_level(
        &self,
        e: BytesStart<'_>,
        is_empty: bool,
        state: &mut Progress,
        writer: &mut Writer<Vec<u8>>,
    ) -> XlsxResult<()> {
        let name = e.local_name().as_ref().to_vec();
        if name == b"sheetData" && !state.cols_done {
            state.cols_done = true;
            if self.widths_changed {
                push(writer, cols_xml(self.sheet));
            }
        }
        if !state.merges_done && AFTER_MERGE_CELLS.contains(&name.as_slice()) {
            state.merges_done = true;
            push(writer, merge_cells_xml(self.sheet));
        }

        let replaced = match name.as_slice() {
            b"sheetData" => {
                if is_empty {
                    self.push_sheet_data(writer, &BTreeMap::new());
                }
                true
            }
            b"mergeCells" => {
                state.merges_done = true;
                push(writer, merge_cells_xml(self.sheet));
                true
            }
            b"cols" if self.widths_changed => {
                state.cols_done = true;
                push(writer, cols_xml(self.sheet));
                true
            }
            b"cols" => {
                state.cols_done = true;
                false
            }
            _ => false,
        };

        if replaced {
            if !is_empty {
                state.depth += 1;
                state.skipping = Some(name);
            }
            return Ok(());
        }

        let e = if name == b"dimension" {
            let used = self
                .sheet
                .used_range()
                .map_or_else(|| "A1".to_string(), |range| range.to_string());
            replace_attr(&e, b"ref", &used)?
        } else {
            match self.shift.element(&e)? {
                Some(moved) => moved,
                None => e.into_owned(),
            }
        };
        if is_empty {
            writer.write_event(Event::Empty(e))?;
        } else {
            state.depth += 1;
            writer.write_event(Event::Start(e))?;
        }
        Ok(())
    }

    fn push_sheet_data(&self, writer: &mut Writer<Vec<u8>>, original: &BTreeMap<u32, String>) {
        let row_attrs: BTreeMap<u32, String> = original
            .iter()
            .map(|(&row, attrs)| (self.shift.row(row), attrs.clone()))
            .collect();
        let xml = sheet_data_xml(
            self.sheet,
            |local| self.xfs.get(&local).copied().unwrap_or(0),
            &row_attrs,
        );
        push(writer, Some(xml));
    }
}

fn push(writer: &mut Writer<Vec<u8>>, xml: Option<String>) {
    if let Some(xml) = xml {
        writer.get_mut().extend_from_slice(xml.as_bytes());
    }
}

impl Progress {
    fn keep_row_attrs(&mut self, e: &BytesStart<'_>) -> XlsxResult<()> {
        let mut row = self.next_row;
        let mut kept = String::new();
        for attr in e.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = attr.key.as_ref();
            if key == b"r" {
                if let Some(r) = attr.unescape_value()?.parse::<u32>().ok().filter(|&r| r > 0) {
                    row = r - 1;
                }
            }
            if !MODELED_ROW_ATTRS.contains(&key) {
                kept.push_str(&format!(
                    " {}=\"{}\"",
                    String::from_utf8_lossy(key),
                    escape_xml(&attr.unescape_value()?)
                ));
            }
        }
        self.next_row = row.saturating_add(1);
        if !kept.is_empty() {
            self.row_attrs.insert(row, kept);
        }
        Ok(())
    }
}

fn unexpected_end() -> XlsxError {
    XlsxError::InvalidFormat("worksheet part ends inside an element".into())
}

/// Move the cell anchors of a part that hangs off a worksheet: drawing
/// anchors (`<xdr:from>`/`<xdr:to>` rows, 0-based) and `ref`/`sqref` of
/// comments and tables
pub(crate) fn shift_anchored_part(xml: &[u8], shift: &RowShift) -> XlsxResult<Vec<u8>> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    let mut in_anchor = false;
    let mut in_row = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                match e.local_name().as_ref() {
                    b"from" | b"to" => in_anchor = true,
                    b"row" if in_anchor => in_row = true,
                    _ => {}
                }
                match shift.element(&e)? {
                    Some(moved) => writer.write_event(Event::Start(moved))?,
                    None => writer.write_event(Event::Start(e))?,
                }
            }
            Event::Empty(e) => match shift.element(&e)? {
                Some(moved) => writer.write_event(Event::Empty(moved))?,
                None => writer.write_event(Event::Empty(e))?,
            },
            Event::Text(t) if in_row => {
                let parsed = t.unescape()?.trim().parse::<u32>();
                match parsed {
                    Ok(row) => {
                        let moved = shift.row(row).to_string();
                        writer.write_event(Event::Text(BytesText::new(&moved)))?;
                    }
                    Err(_) => writer.write_event(Event::Text(t))?,
                }
            }
            Event::End(e) => {
                match e.local_name().as_ref() {
                    b"from" | b"to" => in_anchor = false,
                    b"row" => in_row = false,
                    _ => {}
                }
                writer.write_event(Event::End(e))?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }
    Ok(writer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoop_sheets_core::CellRange;
    use pretty_assertions::assert_eq;

    const SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><dimension ref="A1:B3"/><sheetViews><sheetView workbookViewId="0"><pane ySplit="1" topLeftCell="A2" activePane="bottomLeft" state="frozen"/></sheetView></sheetViews><cols><col min="1" max="1" width="20" style="4" customWidth="1"/></cols><sheetData><row r="1" spans="1:2" s="3" customFormat="1"><c r="A1" t="inlineStr"><is><t>Name</t></is></c></row><row r="2" ht="30" customHeight="1"><c r="A2"><v>1</v></c></row><row r="3" hidden="1"><c r="A3"><v>2</v></c></row></sheetData><hyperlinks><hyperlink ref="A3" r:id="rId1"/></hyperlinks><pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/><pageSetup orientation="landscape"/><drawing r:id="rId2"/></worksheet>"#;

    fn sheet() -> Worksheet {
        let mut sheet = Worksheet::new("Roster");
        sheet.set_cell_value("A1", "Name").unwrap();
        sheet.set_cell_value("A2", 1).unwrap();
        sheet.set_cell_value("A3", 2).unwrap();
        sheet.set_row_height(1, 30.0);
        sheet.set_column_width(0, 20.0);
        sheet
    }

    fn rewrite(sheet: &Worksheet, widths_changed: bool) -> String {
        let shift = RowShift::new(sheet.row_insertions());
        let xfs = HashMap::new();
        let rewrite = SheetRewrite {
            sheet,
            xfs: &xfs,
            shift: &shift,
            widths_changed,
        };
        String::from_utf8(rewrite.apply(SHEET.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn test_unmodeled_elements_survive() {
        let xml = rewrite(&sheet(), false);
        assert!(xml.contains(r#"<pane ySplit="1" topLeftCell="A2" activePane="bottomLeft""#));
        assert!(xml.contains(r#"<col min="1" max="1" width="20" style="4" customWidth="1"/>"#));
        assert!(xml.contains(r#"<row r="1" s="3" customFormat="1">"#));
        assert!(xml.contains(r#"<row r="2" ht="30" customHeight="1">"#));
        assert!(xml.contains(r#"<row r="3" hidden="1">"#));
        assert!(xml.contains(r#"<hyperlink ref="A3" r:id="rId1"/>"#));
        assert!(xml.contains(r#"<pageSetup orientation="landscape"/><drawing r:id="rId2"/></worksheet>"#));
        assert!(!xml.contains("mergeCells"));
    }

    #[test]
    fn test_inserted_rows_move_attributes_and_anchors() {
        let mut sheet = sheet();
        sheet.insert_rows(2, 2).unwrap();
        sheet.set_cell_value("A3", "new").unwrap();
        sheet.merge_cells(&CellRange::parse("A1:B1").unwrap()).unwrap();

        let xml = rewrite(&sheet, false);
        assert!(xml.contains(r#"<dimension ref="A1:A5"/>"#));
        assert!(xml.contains(r#"<row r="5" hidden="1">"#));
        assert!(!xml.contains(r#"<row r="3" hidden="1">"#));
        assert!(xml.contains(r#"<hyperlink ref="A5" r:id="rId1"/>"#));

        let merges = xml.find("<mergeCells count=\"1\">").unwrap();
        assert!(xml.find("</sheetData>").unwrap() < merges);
        assert!(merges < xml.find("<hyperlinks>").unwrap());
    }

    #[test]
    fn test_changed_widths_regenerate_cols() {
        let mut sheet = sheet();
        sheet.set_column_width(1, 9.0);
        let xml = rewrite(&sheet, true);
        assert!(xml.contains(r#"<col min="2" max="2" width="9" customWidth="1"/>"#));
        assert!(!xml.contains(r#"style="4""#));
        assert_eq!(xml.matches("<cols>").count(), 1);
    }

    #[test]
    fn test_drawing_anchor_rows_move() {
        let drawing = r#"<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing"><xdr:twoCellAnchor><xdr:from><xdr:col>0</xdr:col><xdr:row>0</xdr:row></xdr:from><xdr:to><xdr:col>2</xdr:col><xdr:row>5</xdr:row></xdr:to></xdr:twoCellAnchor></xdr:wsDr>"#;
        let shifted = shift_anchored_part(drawing.as_bytes(), &RowShift::new(&[(3, 4)])).unwrap();
        let shifted = String::from_utf8(shifted).unwrap();
        assert!(shifted.contains("<xdr:from><xdr:col>0</xdr:col><xdr:row>0</xdr:row></xdr:from>"));
        assert!(shifted.contains("<xdr:to><xdr:col>2</xdr:col><xdr:row>9</xdr:row></xdr:to>"));
    }
}
