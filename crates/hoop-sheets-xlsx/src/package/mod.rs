//! Editing a workbook inside the package it came from
//!
//! [`XlsxWriter`](crate::XlsxWriter) builds a fresh package holding only
//! what the model knows. A template also carries drawings, print setup,
//! defined names, frozen panes, validations and more, so edits to a
//! template go through [`XlsxPackage`] instead: worksheet parts are
//! rewritten around a regenerated `<sheetData>`, styles.xml only grows,
//! and every other part is copied byte for byte.

mod refs;
mod sheet;
mod styles;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use quick_xml::writer::Writer;

use crate::error::{XlsxError, XlsxResult};
use crate::reader::{SheetSource, XlsxReader, STYLES_PART, WORKBOOK_PART, WORKBOOK_RELS_PART};
use crate::styles::{attr, StyleSheet, StyleTable};
use hoop_sheets_core::Workbook;

use refs::{shift_defined_name, RowShift};
use sheet::{shift_anchored_part, SheetRewrite};
use styles::StylePatch;

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
const CALC_CHAIN_PART: &str = "xl/calcChain.xml";

/// Relationship types whose parts anchor to worksheet rows
const ANCHORED_RELS: [&str; 3] = ["/drawing", "/comments", "/table"];

/// One zip entry, kept in archive order
#[derive(Debug, Clone)]
struct Part {
    name: String,
    data: Vec<u8>,
}

/// A workbook together with the package it was read from
///
/// ```no_run
/// use hoop_sheets_xlsx::XlsxPackage;
///
/// let mut package = XlsxPackage::read_file("roster.xlsx")?;
/// if let Some(sheet) = package.workbook_mut().worksheet_mut(0) {
///     sheet.set_cell_value("B2", "{{clubName}}")?;
/// }
/// let bytes = package.to_bytes()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct XlsxPackage {
    workbook: Workbook,
    parts: Vec<Part>,
    sheets: Vec<SheetSource>,
    styles: Option<StyleSheet>,
}

impl XlsxPackage {
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        Self::read(BufReader::new(File::open(path)?))
    }

    pub fn read_bytes(bytes: &[u8]) -> XlsxResult<Self> {
        Self::read(Cursor::new(bytes))
    }

    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let contents = XlsxReader::read_archive(&mut archive)?;

        let mut parts = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            if file.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            parts.push(Part {
                name: file.name().to_string(),
                data,
            });
        }

        Ok(Self {
            workbook: contents.workbook,
            parts,
            sheets: contents.sheets,
            styles: contents.styles,
        })
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    /// Edit the workbook; adding or removing worksheets makes
    /// [`to_bytes`](Self::to_bytes) fail
    pub fn workbook_mut(&mut self) -> &mut Workbook {
        &mut self.workbook
    }

    fn find(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.data.as_slice())
    }

    fn part(&self, name: &str) -> XlsxResult<&[u8]> {
        self.find(name)
            .ok_or_else(|| XlsxError::MissingPart(name.to_string()))
    }

    /// Serialize the edited workbook back into its package
    ///
    /// Row insertions made through the model move hyperlinks, validations,
    /// conditional formats, drawing anchors, comments, tables and print
    /// areas along with the cells. The calculation chain is dropped so
    /// spreadsheet applications rebuild it.
    pub fn to_bytes(&self) -> XlsxResult<Vec<u8>> {
        if self.workbook.sheet_count() != self.sheets.len() {
            return Err(XlsxError::InvalidFormat(format!(
                "package was read with {} worksheets, the workbook now has {}",
                self.sheets.len(),
                self.workbook.sheet_count()
            )));
        }

        let mut replaced: HashMap<String, Vec<u8>> = HashMap::new();
        let (xf_maps, new_styles_part) = self.style_maps(&mut replaced)?;
        let shifts: Vec<RowShift> = self
            .workbook
            .worksheets()
            .map(|sheet| RowShift::new(sheet.row_insertions()))
            .collect();

        for (index, (sheet, source)) in self.workbook.worksheets().zip(&self.sheets).enumerate() {
            let rewrite = SheetRewrite {
                sheet,
                xfs: &xf_maps[index],
                shift: &shifts[index],
                widths_changed: sheet.column_widths() != &source.widths,
            };
            let rewritten = rewrite.apply(self.part(&source.path)?)?;
            replaced.insert(source.path.clone(), rewritten);

            if !shifts[index].is_empty() {
                for path in self.anchored_parts(&source.path)? {
                    if let Some(data) = self.find(&path) {
                        replaced.insert(path, shift_anchored_part(data, &shifts[index])?);
                    }
                }
            }
        }

        if let Some(workbook_xml) = self.workbook_xml(&shifts)? {
            replaced.insert(WORKBOOK_PART.to_string(), workbook_xml);
        }
        self.registry_parts(&mut replaced, new_styles_part)?;

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for part in &self.parts {
            if part.name == CALC_CHAIN_PART {
                continue;
            }
            let data = replaced.remove(&part.name);
            zip.start_file(part.name.as_str(), options)?;
            zip.write_all(data.as_deref().unwrap_or(&part.data))?;
        }
        if let Some(styles) = replaced.remove(STYLES_PART) {
            zip.start_file(STYLES_PART, options)?;
            zip.write_all(&styles)?;
        }
        let bytes = zip.finish()?.into_inner();

        log::debug!(
            "package written: {} parts, {} sheets",
            self.parts.len(),
            self.sheets.len()
        );
        Ok(bytes)
    }

    /// Local style slot -> xf id for every sheet
    ///
    /// Styles a cell was read with keep their xf; new ones are appended to
    /// the package's styles.xml. Returns whether a styles part had to be
    /// created from scratch.
    fn style_maps(
        &self,
        replaced: &mut HashMap<String, Vec<u8>>,
    ) -> XlsxResult<(Vec<HashMap<u32, u32>>, bool)> {
        let original = self.find(STYLES_PART);
        if let (Some(existing), Some(xml)) = (&self.styles, original) {
            if existing.xf_count > 0 {
                let mut patch = StylePatch::new(existing, xml)?;
                let mut maps = Vec::with_capacity(self.sheets.len());
                for (sheet, source) in self.workbook.worksheets().zip(&self.sheets) {
                    let mut map = HashMap::new();
                    for (local, style) in sheet.style_pool().iter() {
                        let xf = match source.xfs.get(&local) {
                            _ if local == 0 => 0,
                            Some(&xf) => xf,
                            None => patch.xf_id(style),
                        };
                        map.insert(local, xf);
                    }
                    maps.push(map);
                }
                if patch.has_additions() {
                    replaced.insert(STYLES_PART.to_string(), patch.apply(xml)?);
                }
                return Ok((maps, false));
            }
        }

        let table = StyleTable::build(&self.workbook);
        let maps = self
            .workbook
            .worksheets()
            .enumerate()
            .map(|(index, sheet)| {
                sheet
                    .style_pool()
                    .iter()
                    .map(|(local, _)| (local, table.xf_id(index, local)))
                    .collect::<HashMap<u32, u32>>()
            })
            .collect();
        replaced.insert(STYLES_PART.to_string(), table.to_xml().into_bytes());
        Ok((maps, original.is_none()))
    }

    /// Drawings, comments and tables related to a worksheet part
    fn anchored_parts(&self, sheet_path: &str) -> XlsxResult<Vec<String>> {
        let Some(rels) = self.find(&rels_path(sheet_path)) else {
            return Ok(Vec::new());
        };
        let base = sheet_path.rsplit_once('/').map_or("", |(dir, _)| dir);
        Ok(relationships(rels)?
            .into_iter()
            .filter(|rel| !rel.external && ANCHORED_RELS.iter().any(|t| rel.kind.ends_with(t)))
            .map(|rel| resolve(base, &rel.target))
            .collect())
    }

    /// workbook.xml with renamed tabs and shifted defined names, if either
    /// changed
    fn workbook_xml(&self, shifts: &[RowShift]) -> XlsxResult<Option<Vec<u8>>> {
        let renames: HashMap<usize, &str> = self
            .workbook
            .worksheets()
            .zip(&self.sheets)
            .filter(|(sheet, source)| sheet.name() != source.name)
            .map(|(sheet, source)| (source.position, sheet.name()))
            .collect();
        let by_name: HashMap<&str, &RowShift> = self
            .sheets
            .iter()
            .zip(shifts)
            .filter(|(_, shift)| !shift.is_empty())
            .map(|(source, shift)| (source.name.as_str(), shift))
            .collect();
        if renames.is_empty() && by_name.is_empty() {
            return Ok(None);
        }

        let xml = self.part(WORKBOOK_PART)?;
        let mut reader = Reader::from_reader(xml);
        let mut writer = Writer::new(Vec::with_capacity(xml.len()));
        let mut position = 0usize;
        let mut in_defined_name = false;

        loop {
            match reader.read_event()? {
                Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                    let e = match renames.get(&position) {
                        Some(name) => replace_attr(&e, b"name", name)?,
                        None => e.into_owned(),
                    };
                    position += 1;
                    writer.write_event(Event::Empty(e))?;
                }
                Event::Start(e) => {
                    in_defined_name = e.local_name().as_ref() == b"definedName";
                    writer.write_event(Event::Start(e))?;
                }
                Event::Text(t) if in_defined_name => {
                    let formula = t.unescape()?.into_owned();
                    let shifted = shift_defined_name(&formula, |name| by_name.get(name).copied());
                    writer.write_event(Event::Text(BytesText::new(&shifted)))?;
                }
                Event::End(e) => {
                    in_defined_name = false;
                    writer.write_event(Event::End(e))?;
                }
                Event::Eof => break,
                other => writer.write_event(other)?,
            }
        }
        Ok(Some(writer.into_inner()))
    }

    /// Content types and workbook relationships: drop the calculation
    /// chain, register a styles part created from scratch
    fn registry_parts(
        &self,
        replaced: &mut HashMap<String, Vec<u8>>,
        new_styles_part: bool,
    ) -> XlsxResult<()> {
        let drop_calc_chain = self.find(CALC_CHAIN_PART).is_some();
        if !drop_calc_chain && !new_styles_part {
            return Ok(());
        }

        let mut types = self.part(CONTENT_TYPES_PART)?.to_vec();
        let mut rels = self.part(WORKBOOK_RELS_PART)?.to_vec();
        if drop_calc_chain {
            types = drop_elements(&types, |e| {
                attr(e, b"PartName").as_deref() == Some("/xl/calcChain.xml")
            })?;
            rels = drop_elements(&rels, |e| {
                attr(e, b"Type").is_some_and(|t| t.ends_with("/calcChain"))
            })?;
        }
        if new_styles_part {
            types = append_child(
                &types,
                r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
            );
            let ids: Vec<String> = relationships(&rels)?.into_iter().map(|r| r.id).collect();
            let mut n = ids.len() + 1;
            while ids.contains(&format!("rId{}", n)) {
                n += 1;
            }
            rels = append_child(
                &rels,
                &format!(
                    r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
                    n
                ),
            );
        }
        replaced.insert(CONTENT_TYPES_PART.to_string(), types);
        replaced.insert(WORKBOOK_RELS_PART.to_string(), rels);
        Ok(())
    }
}

/// Copy of a start tag with one attribute set, in place when present
pub(crate) fn replace_attr(
    e: &BytesStart<'_>,
    key: &[u8],
    value: &str,
) -> XlsxResult<BytesStart<'static>> {
    let mut out = BytesStart::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    let mut found = false;
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_ref() == key {
            found = true;
            out.push_attribute((String::from_utf8_lossy(key).as_ref(), value));
        } else {
            out.push_attribute(attr);
        }
    }
    if !found {
        out.push_attribute((String::from_utf8_lossy(key).as_ref(), value));
    }
    Ok(out.into_owned())
}

#[derive(Debug)]
struct Relationship {
    id: String,
    kind: String,
    target: String,
    external: bool,
}

fn relationships(xml: &[u8]) -> XlsxResult<Vec<Relationship>> {
    let mut reader = Reader::from_reader(xml);
    let mut rels = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Relationship" => {
                rels.push(Relationship {
                    id: attr(&e, b"Id").unwrap_or_default(),
                    kind: attr(&e, b"Type").unwrap_or_default(),
                    target: attr(&e, b"Target").unwrap_or_default(),
                    external: attr(&e, b"TargetMode").as_deref() == Some("External"),
                });
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(rels)
}

/// `xl/worksheets/sheet1.xml` -> `xl/worksheets/_rels/sheet1.xml.rels`
fn rels_path(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the directory of its source part
fn resolve(base: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            ".." => {
                segments.pop();
            }
            "." | "" => {}
            s => segments.push(s),
        }
    }
    segments.join("/")
}

/// Copy an XML part without the elements `drop` matches
fn drop_elements(xml: &[u8], drop: impl Fn(&BytesStart<'_>) -> bool) -> XlsxResult<Vec<u8>> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    loop {
        match reader.read_event()? {
            Event::Empty(e) if drop(&e) => {}
            Event::Start(e) if drop(&e) => {
                reader.read_to_end(e.name())?;
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }
    Ok(writer.into_inner())
}

/// Insert `child` right before the closing tag of the root element
fn append_child(xml: &[u8], child: &str) -> Vec<u8> {
    match xml.windows(2).rposition(|w| w == b"</") {
        Some(pos) => {
            let mut out = Vec::with_capacity(xml.len() + child.len());
            out.extend_from_slice(&xml[..pos]);
            out.extend_from_slice(child.as_bytes());
            out.extend_from_slice(&xml[pos..]);
            out
        }
        None => xml.to_vec(),
    }
}
