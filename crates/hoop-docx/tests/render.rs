//! Render whole packages

use std::io::{Cursor, Read, Write};

use hoop_docx::{DocxError, DocxRenderOptions, DocxTemplate};
use pretty_assertions::assert_eq;
use serde_json::json;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn package(parts: &[(&str, String)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in parts {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn document(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}"><w:body>{body}</w:body></w:document>"#
    )
}

fn part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut out = String::new();
    file.read_to_string(&mut out).unwrap();
    out
}

fn roster_template() -> Vec<u8> {
    let body = concat!(
        // Word split this command over three runs
        "<w:p><w:r><w:t>Roster {{</w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>club</w:t></w:r><w:r><w:t>Name}}</w:t></w:r></w:p>",
        "<w:tbl>",
        "<w:tr><w:tc><w:p><w:r><w:t>Name</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>Category</w:t></w:r></w:p></w:tc></w:tr>",
        "<w:tr>",
        "<w:tc><w:p><w:r><w:t>{{FOR p IN players}}{{$p.playerLastName}}</w:t></w:r></w:p></w:tc>",
        "<w:tc><w:p><w:r><w:t>{{$p.playerCategory}}{{END-FOR p}}</w:t></w:r></w:p></w:tc>",
        "</w:tr>",
        "</w:tbl>",
        "<w:sectPr/>"
    );
    package(&[
        ("[Content_Types].xml", "<Types/>".to_string()),
        ("word/document.xml", document(body)),
        (
            "word/header1.xml",
            format!(r#"<w:hdr xmlns:w="{W_NS}"><w:p><w:r><w:t>{{{{seasonLabel}}}}</w:t></w:r></w:p></w:hdr>"#),
        ),
        ("word/styles.xml", "<w:styles/>".to_string()),
    ])
}

#[test]
fn test_render_roster_package() {
    let data = json!({
        "clubName": "Hoop",
        "seasonLabel": "2025-2026",
        "players": [
            {"playerLastName": "Doe", "playerCategory": "U11"},
            {"playerLastName": "Roe", "playerCategory": "U13"},
        ],
    });
    let template = DocxTemplate::from_bytes(&roster_template()).unwrap();
    let out = template.render(&data, &DocxRenderOptions::default()).unwrap();

    let doc = part(&out, "word/document.xml");
    assert!(doc.starts_with("<?xml version=\"1.0\""));
    assert!(doc.contains(">Hoop<"));
    assert!(!doc.contains("{{"));
    assert_eq!(doc.matches("<w:tr>").count(), 3);
    let doe = doc.find(">Doe<").unwrap();
    let roe = doc.find(">Roe<").unwrap();
    assert!(doe < roe);
    assert!(doc.contains(">U13<"));

    assert!(part(&out, "word/header1.xml").contains(">2025-2026<"));
    assert_eq!(part(&out, "word/styles.xml"), "<w:styles/>");
}

#[test]
fn test_inserted_names() {
    let template = DocxTemplate::from_bytes(&roster_template()).unwrap();
    let names = template
        .inserted_names(&DocxRenderOptions::default())
        .unwrap();
    assert_eq!(
        names,
        vec!["clubName", "playerLastName", "playerCategory", "seasonLabel"]
    );
}

#[test]
fn test_custom_delimiters() {
    let bytes = package(&[(
        "word/document.xml",
        document("<w:p><w:r><w:t>[[clubName]] {{kept}}</w:t></w:r></w:p>"),
    )]);
    let options = DocxRenderOptions::default().with_delimiters("[[", "]]");
    let out = hoop_docx::render(&bytes, &json!({"clubName": "Hoop"}), &options).unwrap();
    let doc = part(&out, "word/document.xml");
    assert!(doc.contains(">Hoop<"));
    assert!(doc.contains("{{kept}}"));
}

#[test]
fn test_missing_document_part() {
    let bytes = package(&[("word/styles.xml", "<w:styles/>".to_string())]);
    assert!(matches!(
        DocxTemplate::from_bytes(&bytes),
        Err(DocxError::MissingPart(p)) if p == "word/document.xml"
    ));
}

#[test]
fn test_unknown_field_fails_render() {
    let bytes = package(&[(
        "word/document.xml",
        document("<w:p><w:r><w:t>{{nope}}</w:t></w:r></w:p>"),
    )]);
    let err = hoop_docx::render(&bytes, &json!({}), &DocxRenderOptions::default()).unwrap_err();
    assert_eq!(err.to_string(), "Unknown field: nope");
}
