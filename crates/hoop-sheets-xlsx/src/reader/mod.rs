//! XLSX reader

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::{attr, read_styles_xml, StyleSheet};
use hoop_sheets_core::style::Style;
use hoop_sheets_core::{CellAddress, CellError, CellRange, CellValue, Workbook, Worksheet};

/// Expand the `_xHHHH_` escapes spreadsheet applications use for control
/// characters in cell text (`_x000a_` is a line feed)
///
/// Sequences that are not exactly four hex digits between `_x` and `_` are
/// left untouched.
fn unescape_ooxml(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find("_x") {
        out.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);
        match decoded {
            Some(c) => {
                out.push(c);
                rest = &candidate[7..];
            }
            None => {
                out.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// XLSX file reader
pub struct XlsxReader;

pub(crate) const WORKBOOK_PART: &str = "xl/workbook.xml";
pub(crate) const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
pub(crate) const STYLES_PART: &str = "xl/styles.xml";

/// Where a loaded worksheet came from
#[derive(Debug, Clone)]
pub(crate) struct SheetSource {
    /// Zip entry of the worksheet part
    pub path: String,
    /// Index of its `<sheet>` element in workbook.xml
    pub position: usize,
    /// Tab name as read
    pub name: String,
    /// Local style slot -> lowest xf id that produced it
    pub xfs: HashMap<u32, u32>,
    /// Column widths as read
    pub widths: BTreeMap<u16, f64>,
}

/// Everything read from a package
pub(crate) struct Contents {
    pub workbook: Workbook,
    /// One per worksheet, in workbook order
    pub sheets: Vec<SheetSource>,
    /// `None` when the package has no styles part
    pub styles: Option<StyleSheet>,
}

/// What xl/workbook.xml tells us
struct WorkbookPart {
    /// `(name, relationship id)` in tab order
    sheets: Vec<(String, String)>,
    date_1904: bool,
}

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a workbook from an in-memory package
    pub fn read_bytes(bytes: &[u8]) -> XlsxResult<Workbook> {
        Self::read(Cursor::new(bytes))
    }

    /// Read a workbook from a reader
    ///
    /// A package whose workbook lists no sheets yields a workbook with no
    /// worksheets; callers decide whether that is an error.
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;
        Ok(Self::read_archive(&mut archive)?.workbook)
    }

    pub(crate) fn read_archive<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Contents> {
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(archive)?;
        let style_sheet = match archive.by_name(STYLES_PART) {
            Ok(file) => Some(read_styles_xml(file)?),
            Err(_) => None,
        };
        let default_styles = [Style::default()];
        let styles = style_sheet.as_ref().map_or(&default_styles[..], |s| &s.xfs[..]);
        let part = Self::read_workbook_xml(archive)?;
        let sheet_paths = Self::read_workbook_rels(archive)?;

        let mut workbook = Workbook::empty();
        workbook.settings_mut().date_1904 = part.date_1904;
        let mut sources = Vec::with_capacity(part.sheets.len());

        for (position, (name, r_id)) in part.sheets.iter().enumerate() {
            let Some(path) = sheet_paths.get(r_id) else {
                log::warn!("sheet '{}' has no worksheet relationship ({})", name, r_id);
                continue;
            };
            let mut sheet = Worksheet::new(name.as_str());
            let local_styles =
                Self::read_worksheet(archive, path, &mut sheet, &shared_strings, styles)?;
            log::debug!(
                "read sheet '{}' from {}: {} cells, {} merges",
                name,
                path,
                sheet.cell_count(),
                sheet.merged_regions().len()
            );

            let mut xfs: HashMap<u32, u32> = HashMap::new();
            for (&xf, &local) in &local_styles {
                xfs.entry(local)
                    .and_modify(|first| *first = (*first).min(xf))
                    .or_insert(xf);
            }
            sources.push(SheetSource {
                path: path.clone(),
                position,
                name: name.clone(),
                xfs,
                widths: sheet.column_widths().clone(),
            });
            workbook.add_existing_worksheet(sheet)?;
        }

        Ok(Contents {
            workbook,
            sheets: sources,
            styles: style_sheet,
        })
    }

    /// Read the shared strings table
    ///
    /// Rich-text runs are concatenated; phonetic guides (`rPh`) are skipped.
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();
        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings),
        };

        let mut xml = Reader::from_reader(BufReader::new(file));
        // Leading and trailing spaces are part of the text
        xml.trim_text(false);

        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match xml.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => current.clear(),
                    b"rPh" => in_phonetic = true,
                    b"t" if !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => strings.push(String::new()),
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => strings.push(unescape_ooxml(&current)),
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => current.push_str(&e.unescape()?),
                Ok(Event::CData(e)) if in_t => current.push_str(&String::from_utf8_lossy(&e)),
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        log::trace!("sharedStrings.xml: {} entries", strings.len());
        Ok(strings)
    }

    /// Read workbook.xml for the sheet list and the date system
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<WorkbookPart> {
        let file = archive
            .by_name(WORKBOOK_PART)
            .map_err(|_| XlsxError::MissingPart(WORKBOOK_PART.into()))?;

        let mut xml = Reader::from_reader(BufReader::new(file));
        xml.trim_text(true);

        let mut buf = Vec::new();
        let mut part = WorkbookPart {
            sheets: Vec::new(),
            date_1904: false,
        };

        loop {
            match xml.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"workbookPr" => {
                        part.date_1904 =
                            matches!(attr(&e, b"date1904").as_deref(), Some("1") | Some("true"));
                    }
                    b"sheet" => {
                        if let (Some(name), Some(r_id)) = (attr(&e, b"name"), attr(&e, b"r:id")) {
                            part.sheets.push((name, r_id));
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(part)
    }

    /// Read workbook.xml.rels: relationship id -> worksheet part path
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name(WORKBOOK_RELS_PART)
            .map_err(|_| XlsxError::MissingPart(WORKBOOK_RELS_PART.into()))?;

        let mut xml = Reader::from_reader(BufReader::new(file));
        xml.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let is_sheet = attr(&e, b"Type").is_some_and(|t| t.ends_with("/worksheet"));
                    if let (true, Some(id), Some(target)) =
                        (is_sheet, attr(&e, b"Id"), attr(&e, b"Target"))
                    {
                        // Targets are relative to xl/ unless absolute
                        let path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("xl/{}", target),
                        };
                        rels.insert(id, path);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Stream one worksheet part into `sheet`; returns workbook xf id ->
    /// local style slot for every xf the cells used
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        sheet: &mut Worksheet,
        shared_strings: &[String],
        styles: &[Style],
    ) -> XlsxResult<HashMap<u32, u32>> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml = Reader::from_reader(BufReader::new(file));
        xml.trim_text(false);

        let mut state = SheetParser::new(sheet, shared_strings, styles);
        let mut buf = Vec::new();
        loop {
            match xml.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => state.open(&e)?,
                Ok(Event::Empty(e)) => {
                    state.open(&e)?;
                    state.close(e.name().as_ref())?;
                }
                Ok(Event::End(e)) => state.close(e.name().as_ref())?,
                Ok(Event::Text(e)) => {
                    if state.target != Target::None {
                        let text = e.unescape()?;
                        state.push_text(&text);
                    }
                }
                Ok(Event::CData(e)) => state.push_text(&String::from_utf8_lossy(&e)),
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(state.local_styles)
    }
}

/// Where character data inside `<sheetData>` belongs
#[derive(Debug, Clone, Copy, PartialEq)]
enum Target {
    None,
    Value,
    Formula,
    InlineText,
}

/// A `<c>` element being assembled
#[derive(Debug, Default)]
struct PendingCell {
    row: u32,
    col: u16,
    kind: Option<String>,
    xf: u32,
    value: Option<String>,
    formula: Option<String>,
    inline: Option<String>,
}

/// Streaming state for one worksheet part
struct SheetParser<'a> {
    sheet: &'a mut Worksheet,
    shared_strings: &'a [String],
    styles: &'a [Style],
    /// Workbook xf id -> index in this sheet's pool
    local_styles: HashMap<u32, u32>,

    row: u32,
    seen_row: bool,
    next_col: u16,
    cell: Option<PendingCell>,
    target: Target,
    in_inline: bool,
    in_phonetic: bool,
}

impl<'a> SheetParser<'a> {
    fn new(sheet: &'a mut Worksheet, shared_strings: &'a [String], styles: &'a [Style]) -> Self {
        Self {
            sheet,
            shared_strings,
            styles,
            local_styles: HashMap::new(),
            row: 0,
            seen_row: false,
            next_col: 0,
            cell: None,
            target: Target::None,
            in_inline: false,
            in_phonetic: false,
        }
    }

    fn open(&mut self, e: &BytesStart<'_>) -> XlsxResult<()> {
        match e.name().as_ref() {
            b"row" => {
                // Rows without `r` follow the previous one
                self.row = match attr(e, b"r").and_then(|r| r.parse::<u32>().ok()) {
                    Some(r) => r.saturating_sub(1),
                    None if !self.seen_row => 0,
                    None => self.row + 1,
                };
                self.seen_row = true;
                self.next_col = 0;
                if let Some(height) = attr(e, b"ht").and_then(|h| h.parse::<f64>().ok()) {
                    self.sheet.set_row_height(self.row, height);
                }
            }
            b"c" => {
                let (row, col) = match attr(e, b"r") {
                    Some(reference) => {
                        let addr = CellAddress::parse(&reference).map_err(|err| {
                            XlsxError::Parse(format!(
                                "Invalid cell reference '{}': {}",
                                reference, err
                            ))
                        })?;
                        (addr.row, addr.col)
                    }
                    None => (self.row, self.next_col),
                };
                self.row = row;
                self.next_col = col.saturating_add(1);
                self.cell = Some(PendingCell {
                    row,
                    col,
                    kind: attr(e, b"t"),
                    xf: attr(e, b"s").and_then(|s| s.parse().ok()).unwrap_or(0),
                    ..PendingCell::default()
                });
            }
            b"v" if self.cell.is_some() => self.target = Target::Value,
            b"f" if self.cell.is_some() => self.target = Target::Formula,
            b"is" if self.cell.is_some() => self.in_inline = true,
            b"rPh" if self.in_inline => self.in_phonetic = true,
            b"t" if self.in_inline && !self.in_phonetic => self.target = Target::InlineText,
            b"col" => {
                let min = attr(e, b"min").and_then(|v| v.parse::<u32>().ok());
                let max = attr(e, b"max").and_then(|v| v.parse::<u32>().ok());
                let width = attr(e, b"width").and_then(|v| v.parse::<f64>().ok());
                if let (Some(min), Some(max), Some(width)) = (min, max, width) {
                    let last = max.min(hoop_sheets_core::MAX_COLS as u32);
                    for col in min.max(1)..=last {
                        self.sheet.set_column_width((col - 1) as u16, width);
                    }
                }
            }
            b"mergeCell" => {
                if let Some(reference) = attr(e, b"ref") {
                    let merged = CellRange::parse(&reference)
                        .and_then(|range| self.sheet.merge_cells(&range));
                    if let Err(err) = merged {
                        log::warn!("skipping merge '{}': {}", reference, err);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) -> XlsxResult<()> {
        match name {
            b"v" | b"f" | b"t" => self.target = Target::None,
            b"rPh" => self.in_phonetic = false,
            b"is" => self.in_inline = false,
            b"c" => {
                if let Some(cell) = self.cell.take() {
                    self.store(cell)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str) {
        let Some(cell) = self.cell.as_mut() else {
            return;
        };
        let slot = match self.target {
            Target::None => return,
            Target::Value => &mut cell.value,
            Target::Formula => &mut cell.formula,
            Target::InlineText => &mut cell.inline,
        };
        slot.get_or_insert_with(String::new).push_str(text);
    }

    fn store(&mut self, cell: PendingCell) -> XlsxResult<()> {
        let value = decode_value(&cell, self.shared_strings)?;
        let value = match cell.formula {
            // Shared-formula followers carry no text of their own; keep the result
            Some(text) if !text.is_empty() => CellValue::Formula {
                text,
                cached_value: (!value.is_empty()).then(|| Box::new(value)),
            },
            _ => value,
        };
        if !value.is_empty() {
            self.sheet.set_cell_value_at(cell.row, cell.col, value)?;
        }

        if cell.xf != 0 {
            let local = match self.local_styles.get(&cell.xf) {
                Some(&local) => local,
                None => {
                    let style = self.styles.get(cell.xf as usize).ok_or_else(|| {
                        XlsxError::Parse(format!("Style index {} out of bounds", cell.xf))
                    })?;
                    let local = self.sheet.intern_style(style.clone());
                    self.local_styles.insert(cell.xf, local);
                    local
                }
            };
            if local != 0 {
                self.sheet.set_cell_style_index_at(cell.row, cell.col, local)?;
            }
        }
        Ok(())
    }
}

/// The value (or cached formula result) of a finished cell
fn decode_value(cell: &PendingCell, shared_strings: &[String]) -> XlsxResult<CellValue> {
    if cell.kind.as_deref() == Some("inlineStr") {
        return Ok(cell
            .inline
            .as_deref()
            .map_or(CellValue::Empty, |s| CellValue::String(unescape_ooxml(s))));
    }
    let Some(raw) = cell.value.as_deref() else {
        return Ok(CellValue::Empty);
    };

    Ok(match cell.kind.as_deref() {
        Some("s") => {
            let idx: usize = raw.trim().parse().map_err(|_| {
                XlsxError::Parse(format!("Invalid shared string index: {}", raw))
            })?;
            let s = shared_strings.get(idx).ok_or_else(|| {
                XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
            })?;
            CellValue::String(s.clone())
        }
        Some("b") => CellValue::Boolean(matches!(raw.trim(), "1" | "true" | "TRUE")),
        Some("e") => CellError::parse(raw.trim())
            .map(CellValue::Error)
            .unwrap_or_else(|| CellValue::string(raw)),
        Some("str") => CellValue::String(unescape_ooxml(raw)),
        None | Some("n") | Some("d") => match raw.trim().parse::<f64>() {
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::string(raw),
        },
        Some(_) => CellValue::string(raw),
    })
}
