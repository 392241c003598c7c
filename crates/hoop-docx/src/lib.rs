//! # hoop-docx
//!
//! Render Word (.docx) templates against JSON data.
//!
//! Commands are written between delimiters (`{{` and `}}` by default) in
//! the main document, headers and footers:
//!
//! - `{{clubName}}`, `{{INS clubName}}` or `{{= clubName}}` insert a value
//! - `{{FOR p IN players}}` ... `{{END-FOR p}}` repeat what lies between
//! - `{{$p.playerLastName}}` reads a field of the current loop item
//!
//! Commands may be split across runs by Word; they are stitched back
//! together before rendering.
//!
//! ## Example
//!
//! ```rust,no_run
//! use hoop_docx::{DocxRenderOptions, DocxTemplate};
//! use serde_json::json;
//!
//! let template = DocxTemplate::from_bytes(&std::fs::read("roster.docx")?)?;
//! let data = json!({
//!     "clubName": "Hoop",
//!     "players": [{"playerLastName": "Doe"}],
//! });
//! let rendered = template.render(&data, &DocxRenderOptions::default())?;
//! std::fs::write("roster-out.docx", rendered)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod options;

mod command;
mod package;
mod render;
mod runs;
mod xml;

pub use error::{DocxError, DocxResult};
pub use options::DocxRenderOptions;

use std::io::{Cursor, Read, Seek};

use serde_json::Value;

use crate::command::Command;
use crate::package::Entry;
use crate::render::Renderer;

/// A loaded docx template
#[derive(Debug, Clone)]
pub struct DocxTemplate {
    entries: Vec<Entry>,
}

impl DocxTemplate {
    /// Load a template from bytes
    pub fn from_bytes(bytes: &[u8]) -> DocxResult<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Load a template from a reader
    pub fn from_reader<R: Read + Seek>(reader: R) -> DocxResult<Self> {
        let entries = package::read_entries(reader)?;
        Ok(Self { entries })
    }

    /// Render the template, returning a new package
    ///
    /// Parts without commands are copied unchanged.
    pub fn render(&self, data: &Value, options: &DocxRenderOptions) -> DocxResult<Vec<u8>> {
        let renderer = Renderer::new(data, options);
        let mut rendered = Vec::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !entry.is_template_part() {
                rendered.push(entry.clone());
                continue;
            }
            let nodes = self.normalized_part(entry, options)?;
            let nodes = renderer.render(&nodes)?;
            rendered.push(Entry {
                name: entry.name.clone(),
                data: xml::to_xml(&nodes).into_bytes(),
            });
            log::debug!("rendered {}", entry.name);
        }
        package::write_entries(&rendered)
    }

    /// Names inserted by the template, in document order
    ///
    /// Each insert contributes the last segment of its path, so both
    /// `{{clubName}}` and `{{$p.playerLastName}}` are reported. Loop
    /// markers are skipped.
    pub fn inserted_names(&self, options: &DocxRenderOptions) -> DocxResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in self.entries.iter().filter(|e| e.is_template_part()) {
            let nodes = self.normalized_part(entry, options)?;
            collect_inserts(&nodes, options, &mut names)?;
        }
        Ok(names)
    }

    fn normalized_part(&self, entry: &Entry, options: &DocxRenderOptions) -> DocxResult<Vec<xml::Node>> {
        let mut nodes = xml::parse(&entry.data, &entry.name)?;
        runs::normalize(&mut nodes, options);
        Ok(nodes)
    }
}

fn collect_inserts(
    nodes: &[xml::Node],
    options: &DocxRenderOptions,
    names: &mut Vec<String>,
) -> DocxResult<()> {
    for node in nodes {
        if let Some(body) = runs::command_body(node, options) {
            if let Command::Insert(expr) = Command::parse(body)? {
                if let Some(name) = expr.rsplit('.').next() {
                    names.push(name.trim_start_matches('$').to_string());
                }
            }
        } else if let xml::Node::Element(el) = node {
            collect_inserts(&el.children, options, names)?;
        }
    }
    Ok(())
}

/// Render template bytes in one call
pub fn render(template: &[u8], data: &Value, options: &DocxRenderOptions) -> DocxResult<Vec<u8>> {
    DocxTemplate::from_bytes(template)?.render(data, options)
}
