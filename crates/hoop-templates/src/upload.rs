//! Template upload: validation, placeholder discovery and preview

use hoop_docx::{DocxRenderOptions, DocxTemplate};
use hoop_sheets_core::{CellValue, Workbook};
use hoop_sheets_xlsx::XlsxReader;

use crate::error::{TemplateError, TemplateResult};
use crate::mapping::{dedup, validate_mappings, write_placeholders};
use crate::model::CellMapping;
use crate::output::{PreparedTemplate, TemplateFormat};
use crate::placeholders;
use crate::preview::{parse_preview, SpreadsheetPreview};

/// Turn an uploaded file into what the template store keeps
///
/// With mappings (xlsx only) the mappings are validated against the
/// registry and written into the first worksheet. Without, the file is
/// kept as is and its placeholders are discovered from its text.
pub fn prepare_upload(
    filename: &str,
    bytes: &[u8],
    mappings: Option<&[CellMapping]>,
) -> TemplateResult<PreparedTemplate> {
    let format = TemplateFormat::from_filename(filename)?;
    match (format, mappings) {
        (TemplateFormat::Xlsx, Some(mappings)) => {
            let placeholders = validate_mappings(mappings)?;
            let bytes = write_placeholders(bytes, mappings)?;
            Ok(PreparedTemplate {
                format,
                bytes,
                placeholders,
            })
        }
        _ => {
            let placeholders = discover_placeholders(format, bytes)?;
            log::debug!("'{}': found {} placeholders", filename, placeholders.len());
            Ok(PreparedTemplate {
                format,
                bytes: bytes.to_vec(),
                placeholders,
            })
        }
    }
}

/// Distinct registry keys used by a template, in first-seen order
pub fn discover_placeholders(format: TemplateFormat, bytes: &[u8]) -> TemplateResult<Vec<String>> {
    let found = match format {
        TemplateFormat::Xlsx => workbook_tokens(&XlsxReader::read_bytes(bytes)?),
        TemplateFormat::Docx => {
            let options = DocxRenderOptions::default();
            DocxTemplate::from_bytes(bytes)?
                .inserted_names(&options)?
                .into_iter()
                .map(|name| format!("{{{{{}}}}}", name))
                .filter(|token| placeholders::is_known(token))
                .collect()
        }
    };
    Ok(dedup(found))
}

/// Registry keys in the string cells of every sheet, row by row
pub fn workbook_tokens(workbook: &Workbook) -> Vec<String> {
    workbook
        .worksheets()
        .flat_map(|sheet| sheet.iter_cells())
        .filter_map(|(_, _, cell)| match &cell.value {
            CellValue::String(text) => Some(placeholders::tokens_in(text)),
            _ => None,
        })
        .flatten()
        .map(str::to_string)
        .collect()
}

/// Preview an uploaded file; only xlsx files can be previewed
pub fn preview_template(filename: &str, bytes: &[u8]) -> TemplateResult<SpreadsheetPreview> {
    match TemplateFormat::from_filename(filename) {
        Ok(TemplateFormat::Xlsx) => parse_preview(bytes),
        _ => Err(TemplateError::PreviewUnsupported),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoop_sheets_xlsx::XlsxWriter;
    use pretty_assertions::assert_eq;

    fn workbook_bytes() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.worksheet_mut(0).unwrap();
        sheet.set_cell_value("B1", "{{clubName}} {{seasonLabel}}").unwrap();
        sheet.set_cell_value("A2", "{{order}} {{unknown}}").unwrap();
        sheet.set_cell_value("B2", "{{clubName}}").unwrap();
        sheet.set_cell_value("C2", 3).unwrap();
        XlsxWriter::to_bytes(&workbook).unwrap()
    }

    #[test]
    fn test_discovery_in_row_major_order() {
        let prepared = prepare_upload("roster.xlsx", &workbook_bytes(), None).unwrap();
        assert_eq!(prepared.format, TemplateFormat::Xlsx);
        assert_eq!(
            prepared.placeholders,
            vec!["{{clubName}}", "{{seasonLabel}}", "{{order}}"]
        );
    }

    #[test]
    fn test_mappings_are_validated_before_writing() {
        let mappings = [CellMapping::new(0, 0, "{{unknownToken}}")];
        let err = prepare_upload("roster.xlsx", &workbook_bytes(), Some(&mappings)).unwrap_err();
        match err {
            TemplateError::InvalidPlaceholders(keys) => assert_eq!(keys, vec!["{{unknownToken}}"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_mapped_upload_reports_mapping_tokens() {
        let mappings = [
            CellMapping::new(2, 0, "{{playerLastName}}"),
            CellMapping::new(2, 1, "{{playerFirstName}}"),
        ];
        let prepared = prepare_upload("roster.xlsx", &workbook_bytes(), Some(&mappings)).unwrap();
        assert_eq!(
            prepared.placeholders,
            vec!["{{playerLastName}}", "{{playerFirstName}}"]
        );
        let workbook = XlsxReader::read_bytes(&prepared.bytes).unwrap();
        let sheet = workbook.worksheet(0).unwrap();
        assert_eq!(sheet.get_value_at(2, 1).to_string(), "{{playerFirstName}}");
        assert_eq!(sheet.get_value_at(0, 1).to_string(), "{{clubName}} {{seasonLabel}}");
    }

    #[test]
    fn test_unsupported_uploads() {
        assert!(matches!(
            prepare_upload("roster.xls", b"", None),
            Err(TemplateError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            prepare_upload("roster.xlsx", b"not a zip", None),
            Err(TemplateError::Spreadsheet(_))
        ));
        assert!(matches!(
            preview_template("letter.docx", b""),
            Err(TemplateError::PreviewUnsupported)
        ));
        assert!(matches!(
            preview_template("notes.txt", b""),
            Err(TemplateError::PreviewUnsupported)
        ));
    }

    #[test]
    fn test_preview_template() {
        let preview = preview_template("Roster.XLSX", &workbook_bytes()).unwrap();
        assert_eq!((preview.row_count, preview.col_count), (2, 3));
        assert_eq!(
            preview.cell(1, 0).and_then(|c| c.placeholder.as_deref()),
            Some("{{order}}")
        );
    }
}
