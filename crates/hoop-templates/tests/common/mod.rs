//! Fixture templates built in memory

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use chrono::NaiveDate;
use hoop_sheets_core::{BorderEdge, BorderStyle, CellRange, Color, Style, Workbook};
use hoop_sheets_xlsx::XlsxWriter;
use hoop_templates::{CategoryDefinition, Gender, GenerationContext, PlayerRecord};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

pub fn xlsx(workbook: &Workbook) -> Vec<u8> {
    XlsxWriter::to_bytes(workbook).unwrap()
}

/// `[['Name','Age'],['Alice',30]]`
pub fn name_age_sheet() -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.worksheet_mut(0).unwrap();
    sheet.set_cell_value("A1", "Name").unwrap();
    sheet.set_cell_value("B1", "Age").unwrap();
    sheet.set_cell_value("A2", "Alice").unwrap();
    sheet.set_cell_value("B2", 30).unwrap();
    xlsx(&workbook)
}

/// Title over a header row, a styled template row, then a footer
pub fn roster_workbook() -> Workbook {
    let mut workbook = Workbook::new();
    let sheet = workbook.worksheet_mut(0).unwrap();
    sheet.set_name("Roster");

    let title = Style::new().bold(true).font_size(16.0);
    let row = Style::new()
        .italic(true)
        .font_color(Color::rgb(0x1F, 0x3A, 0x93))
        .border(BorderStyle::all(BorderEdge::thin()));

    sheet.set_cell_value("A1", "{{clubName}} ({{clubSection}}) - {{seasonLabel}}").unwrap();
    sheet.set_cell_style("A1", &title).unwrap();
    sheet.merge_cells(&CellRange::parse("A1:D1").unwrap()).unwrap();

    sheet.set_cell_value("A2", "#").unwrap();
    sheet.set_cell_value("B2", "Player").unwrap();
    sheet.set_cell_value("C2", "Born").unwrap();
    sheet.set_cell_value("D2", "Category").unwrap();

    sheet.set_cell_value("A3", "{{order}}").unwrap();
    sheet.set_cell_value("B3", "{{order}}: {{playerLastName}} {{playerFirstName}}").unwrap();
    sheet.set_cell_value("C3", "{{playerBirthDate}}").unwrap();
    sheet.set_cell_value("D3", "{{playerCategory}}").unwrap();
    for col in 0..4 {
        sheet.set_cell_style_at(2, col, &row).unwrap();
    }

    sheet.set_cell_value("A5", "Exported {{exportDate}}").unwrap();
    sheet.merge_cells(&CellRange::parse("A5:B5").unwrap()).unwrap();
    workbook
}

pub fn player(first: &str, last: &str, born: (i32, u32, u32), gender: Gender) -> PlayerRecord {
    PlayerRecord {
        first_name: first.into(),
        last_name: last.into(),
        birth_date: NaiveDate::from_ymd_opt(born.0, born.1, born.2).unwrap(),
        gender,
        address: String::new(),
        phone: None,
        email: None,
    }
}

pub fn context() -> GenerationContext {
    GenerationContext {
        season_label: "2025-2026".into(),
        club_name: "Hoop".into(),
        club_section: "Youth".into(),
        export_date: "01/09/2025".into(),
        categories: vec![
            CategoryDefinition::new("U10", 0, Some(9)),
            CategoryDefinition::new("U12", 10, Some(11)),
            CategoryDefinition::new("Senior", 18, None),
        ],
        players: vec![
            player("Ana", "Diaz", (2015, 6, 15), Gender::Female),
            player("Ben", "Moreau", (2017, 2, 1), Gender::Male),
            player("Chloe", "Petit", (2012, 1, 1), Gender::Female),
        ],
    }
}

/// A spreadsheet package whose workbook lists no sheets
pub fn sheetless_xlsx() -> Vec<u8> {
    zip_package(&[
        ("[Content_Types].xml", "<Types/>".to_string()),
        (
            "xl/workbook.xml",
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheets/></workbook>"#.to_string(),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"/>"#.to_string(),
        ),
    ])
}

pub fn docx(body: &str) -> Vec<u8> {
    zip_package(&[
        ("[Content_Types].xml", "<Types/>".to_string()),
        (
            "word/document.xml",
            format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}"><w:body>{body}</w:body></w:document>"#),
        ),
    ])
}

pub fn zip_package(parts: &[(&str, String)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in parts {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn package_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut out = String::new();
    file.read_to_string(&mut out).unwrap();
    out
}

/// A roster sheet that also carries a logo drawing, a frozen header, a
/// print area, page setup and a hidden notes row below the template row
pub fn decorated_xlsx() -> Vec<u8> {
    const RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
    const DOC_RELS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
    const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
    zip_package(&[
        (
            "[Content_Types].xml",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/drawings/drawing1.xml" ContentType="application/vnd.openxmlformats-officedocument.drawing+xml"/></Types>"#.to_string(),
        ),
        (
            "xl/workbook.xml",
            format!(r#"<workbook xmlns="{MAIN_NS}" xmlns:r="{DOC_RELS}"><sheets><sheet name="Roster" sheetId="1" r:id="rId1"/></sheets><definedNames><definedName name="_xlnm.Print_Area" localSheetId="0">Roster!$A$1:$B$4</definedName></definedNames></workbook>"#),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            format!(r#"<Relationships xmlns="{RELS_NS}"><Relationship Id="rId1" Type="{DOC_RELS}/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#),
        ),
        (
            "xl/worksheets/sheet1.xml",
            format!(r#"<worksheet xmlns="{MAIN_NS}" xmlns:r="{DOC_RELS}"><sheetViews><sheetView workbookViewId="0"><pane ySplit="2" topLeftCell="A3" activePane="bottomLeft" state="frozen"/></sheetView></sheetViews><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>{{{{clubName}}}}</t></is></c></row><row r="2"><c r="A2" t="inlineStr"><is><t>#</t></is></c><c r="B2" t="inlineStr"><is><t>Player</t></is></c></row><row r="3"><c r="A3" t="inlineStr"><is><t>{{{{order}}}}</t></is></c><c r="B3" t="inlineStr"><is><t>{{{{playerLastName}}}}</t></is></c></row><row r="4" hidden="1"><c r="A4" t="inlineStr"><is><t>notes</t></is></c></row></sheetData><pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/><pageSetup orientation="landscape"/><drawing r:id="rId1"/></worksheet>"#),
        ),
        (
            "xl/worksheets/_rels/sheet1.xml.rels",
            format!(r#"<Relationships xmlns="{RELS_NS}"><Relationship Id="rId1" Type="{DOC_RELS}/drawing" Target="../drawings/drawing1.xml"/></Relationships>"#),
        ),
        (
            "xl/drawings/drawing1.xml",
            r#"<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing"><xdr:oneCellAnchor><xdr:from><xdr:col>3</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>4</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from><xdr:ext cx="1" cy="1"/><xdr:pic/><xdr:clientData/></xdr:oneCellAnchor></xdr:wsDr>"#.to_string(),
        ),
        (
            "xl/drawings/_rels/drawing1.xml.rels",
            format!(r#"<Relationships xmlns="{RELS_NS}"><Relationship Id="rId1" Type="{DOC_RELS}/image" Target="../media/image1.png"/></Relationships>"#),
        ),
        ("xl/media/image1.png", "\u{89}PNG logo".to_string()),
    ])
}

pub fn part_names(bytes: &[u8]) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}
