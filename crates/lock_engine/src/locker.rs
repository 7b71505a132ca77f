//! Request dispatch by document kind

use crate::error::LockError;
use crate::kind::DocumentKind;
use crate::{sheet, word, Result};
use doc_model::content_control::{RegionIdAllocator, DEFAULT_REGION_ID_BASE};
use grid_model::{GridModel, DEFAULT_CELL_LIMIT};
use serde::{Deserialize, Serialize};
use store::docx::DocxPackage;
use store::xls::XlsSheet;
use store::xlsx::{write_new_workbook, XlsxWorkbook};

/// Options for one lock request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockOptions {
    /// First form field identifier handed out in a word document
    pub region_id_base: u32,
    /// Largest number of cells a spreadsheet's extent may span
    pub max_cells: u64,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            region_id_base: DEFAULT_REGION_ID_BASE,
            max_cells: DEFAULT_CELL_LIMIT,
        }
    }
}

/// Cell counts of one document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellCounts {
    pub empty_count: usize,
    pub filled_count: usize,
}

impl CellCounts {
    pub fn total(&self) -> usize {
        self.empty_count + self.filled_count
    }
}

/// A locked document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockOutcome {
    pub kind: DocumentKind,
    pub counts: CellCounts,
    /// The locked document, in the kind's output format
    pub bytes: Vec<u8>,
}

/// Locks documents according to their declared kind
#[derive(Debug, Clone, Default)]
pub struct Locker {
    options: LockOptions,
}

impl Locker {
    pub fn new(options: LockOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LockOptions {
        &self.options
    }

    /// Lock a document and return the locked bytes with its cell counts
    pub fn protect(&self, input: &[u8], kind: DocumentKind) -> Result<LockOutcome> {
        tracing::info!("Locking {} document ({} bytes)", kind, input.len());
        let (counts, bytes) = match kind {
            DocumentKind::WordProcessing => self.protect_word(input)?,
            DocumentKind::Spreadsheet => protect_workbook(input, self.options.max_cells)?,
            DocumentKind::LegacySpreadsheet => protect_legacy(input, self.options.max_cells)?,
        };
        tracing::info!(
            "Locked {} document: {} empty, {} filled",
            kind,
            counts.empty_count,
            counts.filled_count
        );
        Ok(LockOutcome { kind, counts, bytes })
    }

    /// Lock a document whose kind is given as a file extension
    pub fn protect_declared(&self, input: &[u8], declared: &str) -> Result<LockOutcome> {
        let kind = DocumentKind::from_extension(declared)?;
        self.protect(input, kind)
    }

    /// Classify the cells of a document without producing output
    pub fn analyze(&self, input: &[u8], kind: DocumentKind) -> Result<CellCounts> {
        let counts = match kind {
            DocumentKind::WordProcessing => {
                let package = DocxPackage::open(input).map_err(LockError::decode)?;
                let (empty_count, filled_count) = word::classify_document(package.document());
                CellCounts {
                    empty_count,
                    filled_count,
                }
            }
            DocumentKind::Spreadsheet => grid_counts(&read_workbook(input, self.options.max_cells)?.1),
            DocumentKind::LegacySpreadsheet => {
                let grid = GridModel::materialize(&open_legacy(input)?, self.options.max_cells)
                    .map_err(LockError::transform)?;
                grid_counts(&grid)
            }
        };
        tracing::info!(
            "Analyzed {} document: {} empty, {} filled",
            kind,
            counts.empty_count,
            counts.filled_count
        );
        Ok(counts)
    }

    fn protect_word(&self, input: &[u8]) -> Result<(CellCounts, Vec<u8>)> {
        let mut package = DocxPackage::open(input).map_err(LockError::decode)?;
        let mut ids = RegionIdAllocator::new(self.options.region_id_base);

        let (document, settings) = package.trees_mut();
        let report = word::transform(document, settings, &mut ids).map_err(LockError::transform)?;

        if let Some(range) = report.id_range() {
            tracing::debug!("Form field ids {}..={}", range.start(), range.end());
        }
        if report.protections_replaced > 0 {
            tracing::debug!("Replaced {} existing protection settings", report.protections_replaced);
        }

        let bytes = package.into_bytes().map_err(LockError::encode)?;
        let counts = CellCounts {
            empty_count: report.empty_count,
            filled_count: report.filled_count,
        };
        Ok((counts, bytes))
    }
}

fn grid_counts(grid: &GridModel) -> CellCounts {
    let report = sheet::classify_grid(grid);
    CellCounts {
        empty_count: report.empty_count,
        filled_count: report.filled_count,
    }
}

fn read_workbook(input: &[u8], max_cells: u64) -> Result<(XlsxWorkbook, GridModel)> {
    let workbook = XlsxWorkbook::open(input).map_err(LockError::decode)?;
    let grid = workbook.read_grid(max_cells).map_err(LockError::decode)?;
    Ok((workbook, grid))
}

fn open_legacy(input: &[u8]) -> Result<XlsSheet> {
    XlsSheet::open(input)
        .map_err(|e| LockError::MalformedInput(format!("unreadable legacy workbook: {}", e)))
}

fn protect_workbook(input: &[u8], max_cells: u64) -> Result<(CellCounts, Vec<u8>)> {
    let (mut workbook, mut grid) = read_workbook(input, max_cells)?;
    let report = sheet::transform(&mut grid);
    workbook.write_grid(&grid).map_err(LockError::encode)?;
    let bytes = workbook.into_bytes().map_err(LockError::encode)?;
    Ok((
        CellCounts {
            empty_count: report.empty_count,
            filled_count: report.filled_count,
        },
        bytes,
    ))
}

fn protect_legacy(input: &[u8], max_cells: u64) -> Result<(CellCounts, Vec<u8>)> {
    let source = open_legacy(input)?;
    let (grid, report) = sheet::transform_source(&source, max_cells).map_err(LockError::transform)?;
    let bytes = write_new_workbook(&grid).map_err(LockError::encode)?;
    Ok((
        CellCounts {
            empty_count: report.empty_count,
            filled_count: report.filled_count,
        },
        bytes,
    ))
}
