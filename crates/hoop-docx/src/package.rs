//! The docx zip package

use std::io::{Cursor, Read, Seek, Write};

use crate::error::{DocxError, DocxResult};

pub(crate) const DOCUMENT_PART: &str = "word/document.xml";

/// One zip entry, kept in archive order
#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub name: String,
    pub data: Vec<u8>,
}

impl Entry {
    /// Main document, headers and footers carry template commands
    pub fn is_template_part(&self) -> bool {
        self.name == DOCUMENT_PART
            || ((self.name.starts_with("word/header") || self.name.starts_with("word/footer"))
                && self.name.ends_with(".xml"))
    }
}

pub(crate) fn read_entries<R: Read + Seek>(reader: R) -> DocxResult<Vec<Entry>> {
    let mut archive = zip::ZipArchive::new(reader)?;
    if archive.by_name(DOCUMENT_PART).is_err() {
        return Err(DocxError::MissingPart(DOCUMENT_PART.into()));
    }

    let mut entries = Vec::with_capacity(archive.len());
    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        if file.is_dir() {
            continue;
        }
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        entries.push(Entry {
            name: file.name().to_string(),
            data,
        });
    }
    Ok(entries)
}

pub(crate) fn write_entries(entries: &[Entry]) -> DocxResult<Vec<u8>> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for entry in entries {
        zip.start_file(entry.name.as_str(), options)?;
        zip.write_all(&entry.data)?;
    }
    Ok(zip.finish()?.into_inner())
}
