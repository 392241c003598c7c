//! Template formats and generated documents

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{TemplateError, TemplateResult};

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateFormat {
    Xlsx,
    Docx,
}

impl TemplateFormat {
    /// Format from the last extension of `filename`, case-insensitive
    pub fn from_filename(filename: &str) -> TemplateResult<Self> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match extension.as_deref() {
            Some("xlsx") => Ok(TemplateFormat::Xlsx),
            Some("docx") => Ok(TemplateFormat::Docx),
            _ => Err(TemplateError::UnsupportedFormat(filename.to_string())),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            TemplateFormat::Xlsx => "xlsx",
            TemplateFormat::Docx => "docx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            TemplateFormat::Xlsx => XLSX_MIME,
            TemplateFormat::Docx => DOCX_MIME,
        }
    }

    /// `{name}.{ext}`, for downloading the stored template itself
    pub fn download_filename(&self, name: &str) -> String {
        format!("{}.{}", name, self.extension())
    }
}

impl fmt::Display for TemplateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A template as kept by the template store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTemplate {
    pub name: String,
    pub format: TemplateFormat,
    pub bytes: Vec<u8>,
}

impl StoredTemplate {
    pub fn new(name: impl Into<String>, format: TemplateFormat, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            format,
            bytes,
        }
    }
}

/// Upload result: the bytes to store and the placeholders they use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTemplate {
    pub format: TemplateFormat,
    pub bytes: Vec<u8>,
    pub placeholders: Vec<String>,
}

/// A generated document ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    /// `{templateName}-{seasonLabel}.{ext}`
    pub filename: String,
}

impl RenderedDocument {
    pub(crate) fn new(
        template: &StoredTemplate,
        season_label: &str,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            bytes,
            content_type: template.format.mime_type(),
            filename: format!(
                "{}-{}.{}",
                template.name,
                season_label,
                template.format.extension()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_filename() {
        assert_eq!(
            TemplateFormat::from_filename("Roster.XLSX").unwrap(),
            TemplateFormat::Xlsx
        );
        assert_eq!(
            TemplateFormat::from_filename("archive.xlsx.docx").unwrap(),
            TemplateFormat::Docx
        );
        for bad in ["roster.xls", "roster", "docx", "notes.pdf"] {
            assert!(matches!(
                TemplateFormat::from_filename(bad),
                Err(TemplateError::UnsupportedFormat(_))
            ));
        }
    }

    #[test]
    fn test_names_and_types() {
        let template = StoredTemplate::new("Licences", TemplateFormat::Docx, Vec::new());
        let doc = RenderedDocument::new(&template, "2025-2026", vec![1]);
        assert_eq!(doc.filename, "Licences-2025-2026.docx");
        assert_eq!(doc.content_type, DOCX_MIME);
        assert_eq!(TemplateFormat::Xlsx.download_filename("Roster"), "Roster.xlsx");
        assert_eq!(TemplateFormat::Xlsx.to_string(), "xlsx");
    }
}
