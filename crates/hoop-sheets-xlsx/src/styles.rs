//! styles.xml encoding and decoding
//!
//! Worksheets own their style pools; on write the pools are merged into one
//! workbook-wide `cellXfs` table, on read every `xf` entry becomes a plain
//! [`Style`] that the reader interns into each sheet on first use.

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use hoop_sheets_core::style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillPattern, FillStyle, FontStyle,
    HorizontalAlignment, NumberFormat, Style, VerticalAlignment,
};
use hoop_sheets_core::Workbook;

/// First id available to custom number formats
pub(crate) const FIRST_CUSTOM_NUMFMT_ID: u32 = 164;

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

// === Writing ===

/// Workbook-wide `cellXfs` table built from the per-sheet pools
#[derive(Debug)]
pub(crate) struct StyleTable {
    /// Index is the xf id written to `s` attributes
    xfs: Vec<Style>,
    /// Per sheet: local pool index -> xf id
    sheet_maps: Vec<HashMap<u32, u32>>,
}

impl StyleTable {
    pub(crate) fn build(workbook: &Workbook) -> Self {
        let mut xfs = vec![Style::default()];
        let mut ids: HashMap<Style, u32> = HashMap::new();
        ids.insert(Style::default(), 0);

        let sheet_maps: Vec<HashMap<u32, u32>> = workbook
            .worksheets()
            .map(|sheet| {
                sheet
                    .style_pool()
                    .iter()
                    .map(|(local, style)| {
                        let id = *ids.entry(style.clone()).or_insert_with(|| {
                            xfs.push(style.clone());
                            (xfs.len() - 1) as u32
                        });
                        (local, id)
                    })
                    .collect::<HashMap<u32, u32>>()
            })
            .collect();

        Self { xfs, sheet_maps }
    }

    pub(crate) fn xf_id(&self, sheet_index: usize, local_index: u32) -> u32 {
        self.sheet_maps
            .get(sheet_index)
            .and_then(|m| m.get(&local_index).copied())
            .unwrap_or(0)
    }

    pub(crate) fn to_xml(&self) -> String {
        let mut fonts = Interner::new(FontStyle::default());
        let mut fills = Interner::new(FillStyle::None);
        // Reserved slot 1: spreadsheet applications expect gray125 here
        fills.push(FillStyle::Pattern {
            pattern: FillPattern::Gray125,
            foreground: Color::Auto,
            background: Color::Auto,
        });
        let mut borders = Interner::new(BorderStyle::default());
        let mut numfmts: Vec<(u32, String)> = Vec::new();

        let mut xf_xml = Vec::with_capacity(self.xfs.len());
        for style in &self.xfs {
            let font_id = fonts.id(&style.font);
            let fill_id = match style.fill {
                FillStyle::None => 0,
                fill => fills.id(&fill),
            };
            let border_id = borders.id(&style.border);
            let numfmt_id = match &style.number_format {
                NumberFormat::General => 0,
                NumberFormat::BuiltIn(id) => *id,
                NumberFormat::Custom(code) => match numfmts.iter().find(|(_, c)| c == code) {
                    Some((id, _)) => *id,
                    None => {
                        let id = FIRST_CUSTOM_NUMFMT_ID + numfmts.len() as u32;
                        numfmts.push((id, code.clone()));
                        id
                    }
                },
            };
            xf_xml.push(write_xf(style, numfmt_id, font_id, fill_id, border_id));
        }

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !numfmts.is_empty() {
            xml.push_str(&format!("\n  <numFmts count=\"{}\">", numfmts.len()));
            for (id, code) in &numfmts {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_xml(code)
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        push_table(&mut xml, "fonts", fonts.items.iter().map(write_font));
        push_table(&mut xml, "fills", fills.items.iter().map(write_fill));
        push_table(&mut xml, "borders", borders.items.iter().map(write_border));

        xml.push_str(
            r#"
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>"#,
        );
        push_table(&mut xml, "cellXfs", xf_xml.into_iter());
        xml.push_str(
            r#"
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
</styleSheet>"#,
        );
        xml
    }
}

/// Ordered, deduplicated component table (fonts, fills, borders)
struct Interner<T> {
    items: Vec<T>,
}

impl<T: Clone + PartialEq> Interner<T> {
    fn new(first: T) -> Self {
        Self { items: vec![first] }
    }

    fn push(&mut self, item: T) {
        self.items.push(item);
    }

    fn id(&mut self, item: &T) -> u32 {
        if let Some(pos) = self.items.iter().position(|x| x == item) {
            return pos as u32;
        }
        self.items.push(item.clone());
        (self.items.len() - 1) as u32
    }
}

fn push_table(xml: &mut String, tag: &str, entries: impl ExactSizeIterator<Item = String>) {
    xml.push_str(&format!("\n  <{} count=\"{}\">", tag, entries.len()));
    for entry in entries {
        xml.push_str("\n    ");
        xml.push_str(&entry);
    }
    xml.push_str(&format!("\n  </{}>", tag));
}

fn color_attrs(color: &Color) -> String {
    match color {
        Color::Auto => " auto=\"1\"".to_string(),
        Color::Rgb { .. } | Color::Argb { .. } => format!(" rgb=\"{}\"", color.to_argb_hex()),
        Color::Indexed(i) => format!(" indexed=\"{}\"", i),
        Color::Theme { index, tint: 0 } => format!(" theme=\"{}\"", index),
        Color::Theme { index, tint } => {
            format!(" theme=\"{}\" tint=\"{}\"", index, *tint as f64 / 100.0)
        }
    }
}

pub(crate) fn write_font(font: &FontStyle) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    if font.strikethrough {
        s.push_str("<strike/>");
    }
    if font.underline {
        s.push_str("<u/>");
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));
    if !font.color.is_auto() {
        s.push_str(&format!("<color{}/>", color_attrs(&font.color)));
    }
    s.push_str(&format!("<name val=\"{}\"/></font>", escape_xml(&font.name)));
    s
}

pub(crate) fn write_fill(fill: &FillStyle) -> String {
    match fill {
        FillStyle::None => "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
        FillStyle::Solid { color } => format!(
            "<fill><patternFill patternType=\"solid\"><fgColor{}/><bgColor indexed=\"64\"/></patternFill></fill>",
            color_attrs(color)
        ),
        FillStyle::Pattern {
            pattern,
            foreground,
            background,
        } => format!(
            "<fill><patternFill patternType=\"{}\"><fgColor{}/><bgColor{}/></patternFill></fill>",
            pattern.as_str(),
            color_attrs(foreground),
            color_attrs(background)
        ),
    }
}

pub(crate) fn write_border(border: &BorderStyle) -> String {
    let edge = |tag: &str, edge: &Option<BorderEdge>| match edge {
        None => format!("<{}/>", tag),
        Some(e) => format!(
            "<{tag} style=\"{}\"><color{}/></{tag}>",
            e.style.as_str(),
            color_attrs(&e.color),
            tag = tag
        ),
    };
    format!(
        "<border>{}{}{}{}<diagonal/></border>",
        edge("left", &border.left),
        edge("right", &border.right),
        edge("top", &border.top),
        edge("bottom", &border.bottom)
    )
}

fn write_alignment(al: &Alignment) -> Option<String> {
    if al.is_default() {
        return None;
    }
    let default = Alignment::default();
    let mut s = String::from("<alignment");
    if al.horizontal != default.horizontal {
        s.push_str(&format!(" horizontal=\"{}\"", al.horizontal.as_str()));
    }
    if al.vertical != default.vertical {
        s.push_str(&format!(" vertical=\"{}\"", al.vertical.as_str()));
    }
    if al.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    if al.indent != 0 {
        s.push_str(&format!(" indent=\"{}\"", al.indent));
    }
    if al.rotation != 0 {
        s.push_str(&format!(" textRotation=\"{}\"", al.rotation));
    }
    s.push_str("/>");
    Some(s)
}

pub(crate) fn write_xf(
    style: &Style,
    numfmt_id: u32,
    font_id: u32,
    fill_id: u32,
    border_id: u32,
) -> String {
    let mut s = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"",
        numfmt_id, font_id, fill_id, border_id
    );
    if numfmt_id != 0 {
        s.push_str(" applyNumberFormat=\"1\"");
    }
    if font_id != 0 {
        s.push_str(" applyFont=\"1\"");
    }
    if fill_id != 0 {
        s.push_str(" applyFill=\"1\"");
    }
    if border_id != 0 {
        s.push_str(" applyBorder=\"1\"");
    }
    match write_alignment(&style.alignment) {
        Some(alignment) => {
            s.push_str(" applyAlignment=\"1\">");
            s.push_str(&alignment);
            s.push_str("</xf>");
        }
        None => s.push_str("/>"),
    }
    s
}

// === Reading ===

/// One `cellXfs` entry before its component ids are resolved
#[derive(Debug, Default, Clone, Copy)]
struct XfRef {
    numfmt_id: u32,
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    alignment: Alignment,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Other,
    Fonts,
    Fills,
    Borders,
    CellXfs,
}

#[derive(Debug, Clone, Copy)]
enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

/// Streaming state for styles.xml
#[derive(Default)]
struct StylesParser {
    section: Option<Section>,
    numfmts: HashMap<u32, String>,
    fonts: Vec<FontStyle>,
    fills: Vec<FillStyle>,
    borders: Vec<BorderStyle>,
    xfs: Vec<XfRef>,

    font: Option<FontStyle>,
    fill: Option<(Option<String>, Color, Color)>,
    border: Option<BorderStyle>,
    edge: Option<Edge>,
    xf: Option<XfRef>,
}

impl StylesParser {
    fn section(&self) -> Section {
        self.section.unwrap_or(Section::Other)
    }

    fn open(&mut self, e: &BytesStart<'_>) {
        match (self.section(), e.name().as_ref()) {
            (_, b"fonts") => self.section = Some(Section::Fonts),
            (_, b"fills") => self.section = Some(Section::Fills),
            (_, b"borders") => self.section = Some(Section::Borders),
            (_, b"cellXfs") => self.section = Some(Section::CellXfs),
            (_, b"cellStyleXfs") | (_, b"dxfs") | (_, b"cellStyles") => {
                self.section = Some(Section::Other)
            }
            (_, b"numFmt") => {
                let id = attr(e, b"numFmtId").and_then(|v| v.parse().ok());
                if let (Some(id), Some(code)) = (id, attr(e, b"formatCode")) {
                    self.numfmts.insert(id, code);
                }
            }

            (Section::Fonts, b"font") => self.font = Some(FontStyle::default()),
            (Section::Fonts, tag) => {
                if let Some(font) = self.font.as_mut() {
                    apply_font_child(font, tag, e);
                }
            }

            (Section::Fills, b"fill") => self.fill = Some((None, Color::Auto, Color::Auto)),
            (Section::Fills, b"patternFill") => {
                if let Some(fill) = self.fill.as_mut() {
                    fill.0 = attr(e, b"patternType");
                }
            }
            (Section::Fills, b"fgColor") => {
                if let Some(fill) = self.fill.as_mut() {
                    fill.1 = parse_color(e);
                }
            }
            (Section::Fills, b"bgColor") => {
                if let Some(fill) = self.fill.as_mut() {
                    fill.2 = parse_color(e);
                }
            }

            (Section::Borders, b"border") => self.border = Some(BorderStyle::default()),
            (Section::Borders, b"left" | b"right" | b"top" | b"bottom") => {
                let edge = match e.name().as_ref() {
                    b"left" => Edge::Left,
                    b"right" => Edge::Right,
                    b"top" => Edge::Top,
                    _ => Edge::Bottom,
                };
                self.edge = Some(edge);
                let line = attr(e, b"style").and_then(|s| BorderLineStyle::parse(&s));
                if let (Some(border), Some(line)) = (self.border.as_mut(), line) {
                    *edge_slot(border, edge) = Some(BorderEdge::new(line, Color::Auto));
                }
            }
            (Section::Borders, b"color") => {
                if let (Some(border), Some(edge)) = (self.border.as_mut(), self.edge) {
                    if let Some(slot) = edge_slot(border, edge).as_mut() {
                        slot.color = parse_color(e);
                    }
                }
            }

            (Section::CellXfs, b"xf") => {
                let id = |key: &[u8]| attr(e, key).and_then(|v| v.parse().ok()).unwrap_or(0);
                self.xf = Some(XfRef {
                    numfmt_id: id(b"numFmtId"),
                    font_id: id(b"fontId"),
                    fill_id: id(b"fillId"),
                    border_id: id(b"borderId"),
                    alignment: Alignment::default(),
                });
            }
            (Section::CellXfs, b"alignment") => {
                if let Some(xf) = self.xf.as_mut() {
                    xf.alignment = parse_alignment(e);
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        match (self.section(), name) {
            (_, b"fonts" | b"fills" | b"borders" | b"cellXfs" | b"cellStyleXfs" | b"dxfs") => {
                self.section = None
            }
            (Section::Fonts, b"font") => {
                if let Some(font) = self.font.take() {
                    self.fonts.push(font);
                }
            }
            (Section::Fills, b"fill") => {
                if let Some((pattern, fg, bg)) = self.fill.take() {
                    self.fills.push(finish_fill(pattern.as_deref(), fg, bg));
                }
            }
            (Section::Borders, b"left" | b"right" | b"top" | b"bottom") => self.edge = None,
            (Section::Borders, b"border") => {
                if let Some(border) = self.border.take() {
                    self.borders.push(border);
                }
            }
            (Section::CellXfs, b"xf") => {
                if let Some(xf) = self.xf.take() {
                    self.xfs.push(xf);
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> StyleSheet {
        let xf_count = self.xfs.len();
        let mut xfs: Vec<Style> = self
            .xfs
            .iter()
            .map(|xf| Style {
                font: self
                    .fonts
                    .get(xf.font_id as usize)
                    .cloned()
                    .unwrap_or_default(),
                fill: self.fills.get(xf.fill_id as usize).copied().unwrap_or_default(),
                border: self
                    .borders
                    .get(xf.border_id as usize)
                    .copied()
                    .unwrap_or_default(),
                alignment: xf.alignment,
                number_format: match xf.numfmt_id {
                    0 => NumberFormat::General,
                    id => match self.numfmts.get(&id) {
                        Some(code) => NumberFormat::Custom(code.clone()),
                        None => NumberFormat::BuiltIn(id),
                    },
                },
            })
            .collect();
        if xfs.is_empty() {
            xfs.push(Style::default());
        }
        StyleSheet {
            xfs,
            xf_count,
            fonts: self.fonts,
            fills: self.fills,
            borders: self.borders,
            numfmts: self.numfmts,
        }
    }
}

/// A decoded styles.xml
#[derive(Debug, Clone, Default)]
pub(crate) struct StyleSheet {
    /// Indexed by xf id; never empty, a part without `cellXfs` yields the
    /// default style
    pub xfs: Vec<Style>,
    /// `<xf>` entries actually present in `cellXfs`
    pub xf_count: usize,
    pub fonts: Vec<FontStyle>,
    pub fills: Vec<FillStyle>,
    pub borders: Vec<BorderStyle>,
    /// Declared custom number formats by id
    pub numfmts: HashMap<u32, String>,
}

/// Parse styles.xml
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<StyleSheet> {
    let mut xml = Reader::from_reader(BufReader::new(reader));
    xml.trim_text(true);

    let mut parser = StylesParser::default();
    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => parser.open(&e),
            Ok(Event::Empty(e)) => {
                parser.open(&e);
                parser.close(e.name().as_ref());
            }
            Ok(Event::End(e)) => parser.close(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    let styles = parser.finish();
    log::debug!("styles.xml: {} cell formats", styles.xf_count);
    Ok(styles)
}

pub(crate) fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn is_on(value: Option<String>) -> bool {
    !matches!(value.as_deref(), Some("0") | Some("false"))
}

fn apply_font_child(font: &mut FontStyle, tag: &[u8], e: &BytesStart<'_>) {
    match tag {
        b"b" => font.bold = is_on(attr(e, b"val")),
        b"i" => font.italic = is_on(attr(e, b"val")),
        b"strike" => font.strikethrough = is_on(attr(e, b"val")),
        b"u" => font.underline = attr(e, b"val").as_deref() != Some("none"),
        b"sz" => {
            if let Some(size) = attr(e, b"val").and_then(|v| v.parse().ok()) {
                font.size = size;
            }
        }
        b"name" => {
            if let Some(name) = attr(e, b"val") {
                font.name = name;
            }
        }
        b"color" => font.color = parse_color(e),
        _ => {}
    }
}

fn finish_fill(pattern: Option<&str>, fg: Color, bg: Color) -> FillStyle {
    match pattern {
        Some("solid") => FillStyle::Solid { color: fg },
        // gray125 only ever appears in the reserved slot
        None | Some("none") | Some("gray125") => FillStyle::None,
        Some(other) => match FillPattern::parse(other) {
            Some(pattern) => FillStyle::Pattern {
                pattern,
                foreground: fg,
                background: bg,
            },
            None => FillStyle::None,
        },
    }
}

fn edge_slot(border: &mut BorderStyle, edge: Edge) -> &mut Option<BorderEdge> {
    match edge {
        Edge::Left => &mut border.left,
        Edge::Right => &mut border.right,
        Edge::Top => &mut border.top,
        Edge::Bottom => &mut border.bottom,
    }
}

fn parse_alignment(e: &BytesStart<'_>) -> Alignment {
    let mut al = Alignment::default();
    if let Some(h) = attr(e, b"horizontal") {
        al.horizontal = HorizontalAlignment::parse(&h);
    }
    if let Some(v) = attr(e, b"vertical") {
        al.vertical = VerticalAlignment::parse(&v);
    }
    al.wrap_text = matches!(attr(e, b"wrapText").as_deref(), Some("1") | Some("true"));
    al.indent = attr(e, b"indent").and_then(|v| v.parse().ok()).unwrap_or(0);
    al.rotation = attr(e, b"textRotation")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    al
}

/// Explicit rgb wins over theme, theme over indexed
pub(crate) fn parse_color(e: &BytesStart<'_>) -> Color {
    if let Some(color) = attr(e, b"rgb").and_then(|v| Color::from_hex(&v)) {
        return color;
    }
    if let Some(index) = attr(e, b"theme").and_then(|v| v.parse::<u8>().ok()) {
        let tint = attr(e, b"tint")
            .and_then(|v| v.parse::<f64>().ok())
            .map_or(0, |t| (t * 100.0).round().clamp(-100.0, 100.0) as i8);
        return Color::Theme { index, tint };
    }
    match attr(e, b"indexed").and_then(|v| v.parse::<u8>().ok()) {
        // 64 is the system foreground, i.e. automatic
        Some(64) | None => Color::Auto,
        Some(i) => Color::Indexed(i),
    }
}
