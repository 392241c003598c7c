//! XLSX writer

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;

use crate::error::{XlsxError, XlsxResult};
use crate::styles::{escape_xml, StyleTable};
use hoop_sheets_core::{CellAddress, CellValue, Workbook, Worksheet};

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        let file = File::create(path)?;
        Self::write(workbook, file)
    }

    /// Serialize a workbook into an in-memory package
    pub fn to_bytes(workbook: &Workbook) -> XlsxResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        Self::write(workbook, &mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write a workbook to a writer
    ///
    /// Strings are written inline, so the package carries no shared
    /// strings part.
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        if workbook.is_empty() {
            return Err(XlsxError::InvalidFormat(
                "a workbook needs at least one worksheet".into(),
            ));
        }

        let mut zip = zip::ZipWriter::new(writer);
        let style_table = StyleTable::build(workbook);

        Self::write_part(&mut zip, "[Content_Types].xml", &content_types_xml(workbook))?;
        Self::write_part(&mut zip, "_rels/.rels", ROOT_RELS)?;
        Self::write_part(&mut zip, "xl/workbook.xml", &workbook_xml(workbook))?;
        Self::write_part(
            &mut zip,
            "xl/_rels/workbook.xml.rels",
            &workbook_rels_xml(workbook),
        )?;
        Self::write_part(&mut zip, "xl/styles.xml", &style_table.to_xml())?;

        for (index, sheet) in workbook.worksheets().enumerate() {
            let path = format!("xl/worksheets/sheet{}.xml", index + 1);
            Self::write_part(&mut zip, &path, &worksheet_xml(sheet, index, &style_table))?;
        }

        zip.finish()?;
        log::debug!("wrote workbook with {} sheets", workbook.sheet_count());
        Ok(())
    }

    fn write_part<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        name: &str,
        content: &str,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        zip.start_file(name, options)?;
        zip.write_all(content.as_bytes())?;
        Ok(())
    }
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

fn content_types_xml(workbook: &Workbook) -> String {
    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    );
    for i in 1..=workbook.sheet_count() {
        content.push_str(&format!(
            r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            i
        ));
    }
    content.push_str("\n</Types>");
    content
}

fn workbook_xml(workbook: &Workbook) -> String {
    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );
    if workbook.settings().date_1904 {
        content.push_str("\n    <workbookPr date1904=\"1\"/>");
    }
    content.push_str("\n    <sheets>");
    for (i, sheet) in workbook.worksheets().enumerate() {
        content.push_str(&format!(
            "\n        <sheet name=\"{}\" sheetId=\"{}\" r:id=\"rId{}\"/>",
            escape_xml(sheet.name()),
            i + 1,
            i + 1
        ));
    }
    content.push_str("\n    </sheets>\n</workbook>");
    content
}

fn workbook_rels_xml(workbook: &Workbook) -> String {
    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    let count = workbook.sheet_count();
    for i in 1..=count {
        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i, i
        ));
    }
    content.push_str(&format!(
        r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#,
        count + 1
    ));
    content
}

/// `<cols>` with consecutive equal widths folded into one span
pub(crate) fn cols_xml(sheet: &Worksheet) -> Option<String> {
    let mut spans: Vec<(u16, u16, f64)> = Vec::new();
    for (&col, &width) in sheet.column_widths() {
        match spans.last_mut() {
            Some((_, last, w)) if *last + 1 == col && *w == width => *last = col,
            _ => spans.push((col, col, width)),
        }
    }
    if spans.is_empty() {
        return None;
    }

    let mut xml = String::from("\n    <cols>");
    for (first, last, width) in spans {
        xml.push_str(&format!(
            "\n        <col min=\"{}\" max=\"{}\" width=\"{}\" customWidth=\"1\"/>",
            first + 1,
            last + 1,
            width
        ));
    }
    xml.push_str("\n    </cols>");
    Some(xml)
}

fn worksheet_xml(sheet: &Worksheet, index: usize, styles: &StyleTable) -> String {
    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );
    if let Some(cols) = cols_xml(sheet) {
        content.push_str(&cols);
    }
    content.push_str(&sheet_data_xml(
        sheet,
        |local| styles.xf_id(index, local),
        &BTreeMap::new(),
    ));
    if let Some(merges) = merge_cells_xml(sheet) {
        content.push_str(&merges);
    }
    content.push_str("\n</worksheet>");
    content
}

/// `<sheetData>` for every row holding cells, a custom height or extra
/// attributes
///
/// `xf_id` maps a local style slot to the `s` value; `row_attrs` holds
/// pre-rendered attributes (` hidden="1"`) to append to a row's start tag.
pub(crate) fn sheet_data_xml(
    sheet: &Worksheet,
    xf_id: impl Fn(u32) -> u32,
    row_attrs: &BTreeMap<u32, String>,
) -> String {
    let mut content = String::from("\n    <sheetData>");

    let mut rows: Vec<u32> = sheet
        .row_indices()
        .chain(sheet.custom_row_heights().keys().copied())
        .chain(row_attrs.keys().copied())
        .collect();
    rows.sort_unstable();
    rows.dedup();

    for row in rows {
        content.push_str(&format!("\n        <row r=\"{}\"", row + 1));
        if let Some(height) = sheet.row_height(row) {
            content.push_str(&format!(" ht=\"{}\" customHeight=\"1\"", height));
        }
        if let Some(extra) = row_attrs.get(&row) {
            content.push_str(extra);
        }
        content.push('>');

        for (col, cell) in sheet.iter_row(row) {
            let reference = CellAddress::new(row, col).to_a1_string();
            let style_attr = match xf_id(cell.style_index) {
                0 => String::new(),
                xf => format!(" s=\"{}\"", xf),
            };
            content.push_str("\n            ");
            content.push_str(&cell_xml(&reference, &style_attr, &cell.value));
        }
        content.push_str("\n        </row>");
    }
    content.push_str("\n    </sheetData>");
    content
}

pub(crate) fn merge_cells_xml(sheet: &Worksheet) -> Option<String> {
    let merged = sheet.merged_regions();
    if merged.is_empty() {
        return None;
    }
    let mut xml = format!("\n    <mergeCells count=\"{}\">", merged.len());
    for range in merged {
        xml.push_str(&format!("\n        <mergeCell ref=\"{}\"/>", range));
    }
    xml.push_str("\n    </mergeCells>");
    Some(xml)
}

/// Escape cell text for `<t>` and `<v>`
///
/// Characters XML 1.0 cannot carry are written as `_xHHHH_`. A literal `_x`
/// that would read back as such an escape gets its underscore escaped
/// (`_x005F_`).
fn escape_cell_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        match c {
            '_' if is_ooxml_escape(&s[i..]) => out.push_str("_x005F_"),
            '\t' | '\n' | '\r' => out.push(c),
            '\u{0}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}' => {
                out.push_str(&format!("_x{:04X}_", u32::from(c)))
            }
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

/// `_x` + four hex digits + `_` at the start of `s`
fn is_ooxml_escape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 7
        && bytes.starts_with(b"_x")
        && bytes[2..6].iter().all(u8::is_ascii_hexdigit)
        && bytes[6] == b'_'
}

fn cell_xml(reference: &str, style_attr: &str, value: &CellValue) -> String {
    match value {
        CellValue::Empty => format!("<c r=\"{}\"{}/>", reference, style_attr),
        CellValue::Number(n) if n.is_finite() => {
            format!("<c r=\"{}\"{}><v>{}</v></c>", reference, style_attr, n)
        }
        CellValue::Number(_) => {
            format!("<c r=\"{}\"{} t=\"e\"><v>#NUM!</v></c>", reference, style_attr)
        }
        CellValue::String(s) => format!(
            "<c r=\"{}\"{} t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
            reference,
            style_attr,
            escape_cell_text(s)
        ),
        CellValue::Boolean(b) => format!(
            "<c r=\"{}\"{} t=\"b\"><v>{}</v></c>",
            reference,
            style_attr,
            u8::from(*b)
        ),
        CellValue::Error(e) => format!(
            "<c r=\"{}\"{} t=\"e\"><v>{}</v></c>",
            reference,
            style_attr,
            escape_xml(e.as_str())
        ),
        CellValue::Formula { text, cached_value } => {
            let formula = escape_xml(text.strip_prefix('=').unwrap_or(text));
            let (kind, cached) = match cached_value.as_deref() {
                Some(CellValue::Number(n)) if n.is_finite() => ("", n.to_string()),
                Some(CellValue::String(s)) => (" t=\"str\"", escape_cell_text(s)),
                Some(CellValue::Boolean(b)) => (" t=\"b\"", u8::from(*b).to_string()),
                Some(CellValue::Error(e)) => (" t=\"e\"", e.as_str().to_string()),
                _ => {
                    return format!(
                        "<c r=\"{}\"{}><f>{}</f></c>",
                        reference, style_attr, formula
                    )
                }
            };
            format!(
                "<c r=\"{}\"{}{}><f>{}</f><v>{}</v></c>",
                reference, style_attr, kind, formula, cached
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoop_sheets_core::CellError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cell_xml() {
        assert_eq!(
            cell_xml("A1", "", &CellValue::Number(7.0)),
            "<c r=\"A1\"><v>7</v></c>"
        );
        assert_eq!(
            cell_xml("B2", " s=\"3\"", &CellValue::string("Tom & Jerry")),
            "<c r=\"B2\" s=\"3\" t=\"inlineStr\"><is><t xml:space=\"preserve\">Tom &amp; Jerry</t></is></c>"
        );
        assert_eq!(
            cell_xml("C3", "", &CellValue::Error(CellError::Div0)),
            "<c r=\"C3\" t=\"e\"><v>#DIV/0!</v></c>"
        );
        assert_eq!(
            cell_xml(
                "D4",
                "",
                &CellValue::Formula {
                    text: "=A1&\"x\"".into(),
                    cached_value: Some(Box::new(CellValue::string("7x"))),
                }
            ),
            "<c r=\"D4\" t=\"str\"><f>A1&amp;&quot;x&quot;</f><v>7x</v></c>"
        );
    }

    #[test]
    fn test_cell_text_escapes() {
        assert_eq!(escape_cell_text("O'Neil & <Co>"), "O&apos;Neil &amp; &lt;Co&gt;");
        assert_eq!(escape_cell_text("a\u{1}b\tc\n"), "a_x0001_b\tc\n");
        assert_eq!(escape_cell_text("\u{FFFF}"), "_xFFFF_");
        assert_eq!(escape_cell_text("_x000a_"), "_x005F_x000a_");
        assert_eq!(escape_cell_text("my_x_file _x12_"), "my_x_file _x12_");
    }

    #[test]
    fn test_row_attributes_are_appended() {
        let mut sheet = Worksheet::new("S");
        sheet.set_cell_value("A1", "x").unwrap();
        sheet.set_row_height(0, 20.0);
        let attrs = BTreeMap::from([(0, " s=\"2\"".to_string()), (3, " hidden=\"1\"".to_string())]);

        let xml = sheet_data_xml(&sheet, |_| 0, &attrs);
        assert!(xml.contains("<row r=\"1\" ht=\"20\" customHeight=\"1\" s=\"2\">"));
        assert!(xml.contains("<row r=\"4\" hidden=\"1\">"));
    }

    #[test]
    fn test_cols_fold_equal_neighbours() {
        let mut sheet = Worksheet::new("S");
        sheet.set_column_width(0, 12.0);
        sheet.set_column_width(1, 12.0);
        sheet.set_column_width(3, 12.0);
        sheet.set_column_width(4, 30.0);

        let xml = cols_xml(&sheet).unwrap();
        assert!(xml.contains("<col min=\"1\" max=\"2\" width=\"12\" customWidth=\"1\"/>"));
        assert!(xml.contains("<col min=\"4\" max=\"4\" width=\"12\" customWidth=\"1\"/>"));
        assert!(xml.contains("<col min=\"5\" max=\"5\" width=\"30\" customWidth=\"1\"/>"));
        assert!(cols_xml(&Worksheet::new("T")).is_none());
    }

    #[test]
    fn test_refuses_empty_workbook() {
        assert!(matches!(
            XlsxWriter::to_bytes(&Workbook::empty()),
            Err(XlsxError::InvalidFormat(_))
        ));
    }
}
