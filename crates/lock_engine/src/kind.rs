//! Declared document kinds

use crate::{LockError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// The kind of document a request declares, decided once from the file
/// extension and passed along as a typed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Word-processing package (`.docx`)
    WordProcessing,
    /// Native spreadsheet package (`.xlsx`)
    Spreadsheet,
    /// Legacy binary spreadsheet (`.xls`), locked into a native workbook
    LegacySpreadsheet,
}

impl DocumentKind {
    /// All supported kinds
    pub const ALL: [DocumentKind; 3] = [
        DocumentKind::WordProcessing,
        DocumentKind::Spreadsheet,
        DocumentKind::LegacySpreadsheet,
    ];

    /// Kind for a file extension, with or without the leading dot
    pub fn from_extension(extension: &str) -> Result<Self> {
        let ext = extension.trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "docx" => Ok(DocumentKind::WordProcessing),
            "xlsx" => Ok(DocumentKind::Spreadsheet),
            "xls" => Ok(DocumentKind::LegacySpreadsheet),
            _ => Err(LockError::UnsupportedKind(format!(
                "'{}' (expected one of docx, xlsx, xls)",
                extension
            ))),
        }
    }

    /// Kind for a file name or path
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                LockError::UnsupportedKind(format!("'{}' has no file extension", path.display()))
            })?;
        Self::from_extension(ext)
    }

    /// Input file extension
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::WordProcessing => "docx",
            DocumentKind::Spreadsheet => "xlsx",
            DocumentKind::LegacySpreadsheet => "xls",
        }
    }

    /// Extension of the locked output; legacy input becomes a native workbook
    pub fn output_extension(&self) -> &'static str {
        match self {
            DocumentKind::WordProcessing => "docx",
            DocumentKind::Spreadsheet | DocumentKind::LegacySpreadsheet => "xlsx",
        }
    }

    /// MIME type of the locked output
    pub fn output_content_type(&self) -> &'static str {
        match self {
            DocumentKind::WordProcessing => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            DocumentKind::Spreadsheet | DocumentKind::LegacySpreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

impl FromStr for DocumentKind {
    type Err = LockError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s)
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}
