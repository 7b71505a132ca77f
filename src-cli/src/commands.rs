//! Request-level operations
//!
//! A request carries an uploaded file name and its bytes. The kind comes
//! from the name's extension and is checked before anything touches the
//! disk; the input and the locked output then pass through the request's
//! scratch directory.

use crate::config::LockerConfig;
use crate::error::Result;
use crate::scratch::ScratchDir;
use lock_engine::{CellCounts, DocumentKind, Locker};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A locked document ready to hand back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub counts: CellCounts,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Cell counts of a document that was only classified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspection {
    pub filename: String,
    pub kind: DocumentKind,
    pub counts: CellCounts,
}

/// Lock an uploaded document
pub fn lock_document(config: &LockerConfig, filename: &str, bytes: &[u8]) -> Result<Attachment> {
    let kind = DocumentKind::from_path(filename)?;
    let scratch = ScratchDir::create(&config.scratch_dir)?;
    tracing::info!("Locking {} in {}", filename, scratch.path().display());

    let input_path = scratch.write(filename, bytes)?;
    let input = std::fs::read(&input_path)?;
    let outcome = Locker::new(config.lock_options()).protect(&input, kind)?;

    let output_name = output_filename(&config.output_prefix, filename, kind);
    let output_path = scratch.write(&output_name, &outcome.bytes)?;
    let bytes = std::fs::read(&output_path)?;

    Ok(Attachment {
        filename: output_name,
        content_type: kind.output_content_type().to_string(),
        counts: outcome.counts,
        bytes,
    })
}

/// Classify the cells of an uploaded document
pub fn inspect_document(config: &LockerConfig, filename: &str, bytes: &[u8]) -> Result<Inspection> {
    let kind = DocumentKind::from_path(filename)?;
    let scratch = ScratchDir::create(&config.scratch_dir)?;

    let input_path = scratch.write(filename, bytes)?;
    let input = std::fs::read(&input_path)?;
    let counts = Locker::new(config.lock_options()).analyze(&input, kind)?;

    Ok(Inspection {
        filename: file_name(filename).to_string(),
        kind,
        counts,
    })
}

/// Name of the locked file: prefix, original stem, output extension
pub fn output_filename(prefix: &str, original: &str, kind: DocumentKind) -> String {
    let stem = Path::new(file_name(original))
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    format!("{}{}.{}", prefix, stem, kind.output_extension())
}

fn file_name(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ErrorPayload};
    use grid_model::{CellValue, GridModel};
    use lock_engine::LockError;
    use tempfile::TempDir;

    const LEGACY_FORM: &[u8] = include_bytes!("../../fixtures/xls/legacy_form.xls");

    fn config(root: &TempDir) -> LockerConfig {
        LockerConfig {
            scratch_dir: root.path().join("scratch"),
            ..LockerConfig::default()
        }
    }

    fn workbook() -> Vec<u8> {
        let grid = GridModel::from_rows(
            "Sheet1",
            vec![
                vec![CellValue::from("A"), CellValue::Number(1.0)],
                vec![CellValue::from(""), CellValue::Empty],
            ],
        )
        .unwrap();
        store::xlsx::write_new_workbook(&grid).unwrap()
    }

    fn scratch_entries(config: &LockerConfig) -> usize {
        std::fs::read_dir(&config.scratch_dir).unwrap().count()
    }

    #[test]
    fn test_output_filename() {
        assert_eq!(
            output_filename("protected_", "Form.docx", DocumentKind::WordProcessing),
            "protected_Form.docx"
        );
        assert_eq!(
            output_filename("protected_", "uploads/budget.xls", DocumentKind::LegacySpreadsheet),
            "protected_budget.xlsx"
        );
        assert_eq!(
            output_filename("", "q3.report.XLSX", DocumentKind::Spreadsheet),
            "q3.report.xlsx"
        );
    }

    #[test]
    fn test_lock_cleans_scratch_after_success() {
        let root = TempDir::new().unwrap();
        let config = config(&root);

        let attachment = lock_document(&config, "budget.xlsx", &workbook()).unwrap();
        assert_eq!(attachment.filename, "protected_budget.xlsx");
        assert_eq!(
            attachment.content_type,
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
        assert_eq!(attachment.counts.empty_count, 2);
        assert_eq!(attachment.counts.filled_count, 2);
        assert!(store::PartMap::extract(&attachment.bytes).is_ok());

        assert_eq!(scratch_entries(&config), 0);
    }

    #[test]
    fn test_lock_legacy_workbook() {
        let root = TempDir::new().unwrap();
        let config = config(&root);

        let attachment = lock_document(&config, "uploads/intake.xls", LEGACY_FORM).unwrap();
        assert_eq!(attachment.filename, "protected_intake.xlsx");
        assert_eq!(
            attachment.content_type,
            DocumentKind::Spreadsheet.output_content_type()
        );
        assert_eq!(attachment.counts.empty_count, 5);
        assert_eq!(attachment.counts.filled_count, 4);

        let parts = store::PartMap::extract(&attachment.bytes).unwrap();
        let sheet = String::from_utf8(parts.get("xl/worksheets/sheet1.xml").unwrap().to_vec()).unwrap();
        assert!(sheet.contains(r#"<sheetProtection sheet="1" objects="1" scenarios="1"/>"#));

        assert_eq!(scratch_entries(&config), 0);
    }

    #[test]
    fn test_oversized_sheet_is_malformed_input() {
        let root = TempDir::new().unwrap();
        let config = LockerConfig {
            max_cells: 4,
            ..config(&root)
        };

        let err = lock_document(&config, "intake.xls", LEGACY_FORM).unwrap_err();
        assert_eq!(err.kind(), "malformed_input");
        assert_eq!(scratch_entries(&config), 0);
    }

    #[test]
    fn test_inspect_cleans_scratch() {
        let root = TempDir::new().unwrap();
        let config = config(&root);

        let inspection = inspect_document(&config, "in/budget.xlsx", &workbook()).unwrap();
        assert_eq!(inspection.filename, "budget.xlsx");
        assert_eq!(inspection.kind, DocumentKind::Spreadsheet);
        assert_eq!(inspection.counts.total(), 4);

        assert_eq!(scratch_entries(&config), 0);
    }

    #[test]
    fn test_failure_cleans_scratch() {
        let root = TempDir::new().unwrap();
        let config = config(&root);

        let err = lock_document(&config, "form.docx", b"not a package").unwrap_err();
        assert!(matches!(err, AppError::Lock(LockError::CodecFailure { .. })));
        assert_eq!(ErrorPayload::from(&err).kind, "codec_failure");

        assert_eq!(scratch_entries(&config), 0);
    }

    #[test]
    fn test_unsupported_kind_rejected_before_scratch() {
        let root = TempDir::new().unwrap();
        let config = config(&root);

        let err = lock_document(&config, "notes.pdf", b"%PDF").unwrap_err();
        assert_eq!(err.kind(), "unsupported_kind");
        assert!(!config.scratch_dir.exists());

        let err = inspect_document(&config, "README", b"").unwrap_err();
        assert_eq!(err.kind(), "unsupported_kind");
        assert!(!config.scratch_dir.exists());
    }
}
