//! Word-processing transformer
//!
//! Every table cell is classified in document order: outer tables before
//! the tables nested in them, row-major within a table. Empty cells get
//! their first paragraph wrapped in a plain-text form field; afterwards the
//! settings part is switched to forms-only protection.

use crate::classify::{Classify, TableCell};
use doc_model::content_control::{is_region_content, wrap_in_region, FormFieldRegion, RegionIdAllocator};
use doc_model::protection::DocumentProtection;
use doc_model::table::{first_paragraph, table_cells};
use doc_model::{Result, XmlTree};
use std::ops::RangeInclusive;

/// Outcome of locking one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordReport {
    pub empty_count: usize,
    pub filled_count: usize,
    /// Regions inserted, in document order
    pub regions: Vec<FormFieldRegion>,
    /// Empty cells left alone because they hold no paragraph
    pub paragraphless: usize,
    /// Empty cells whose first paragraph already was a form field
    pub already_wrapped: usize,
    /// Protection assertions removed from the settings part
    pub protections_replaced: usize,
}

impl WordReport {
    /// Total cells visited
    pub fn total(&self) -> usize {
        self.empty_count + self.filled_count
    }

    /// First and last region identifier used
    pub fn id_range(&self) -> Option<RangeInclusive<u32>> {
        let first = self.regions.first()?.id;
        let last = self.regions.last()?.id;
        Some(first..=last)
    }
}

/// Count empty and filled table cells without changing anything
pub fn classify_document(document: &XmlTree) -> (usize, usize) {
    let mut empty = 0;
    let mut filled = 0;
    for location in table_cells(document, document.root()) {
        if TableCell::new(document, location.cell).is_empty_cell() {
            empty += 1;
        } else {
            filled += 1;
        }
    }
    (empty, filled)
}

/// Wrap the first paragraph of every empty table cell in a form field
pub fn wrap_empty_cells(document: &mut XmlTree, ids: &mut RegionIdAllocator) -> Result<WordReport> {
    let mut report = WordReport::default();

    // Cells are collected up front; wrapping only adds nodes between a cell
    // and its paragraph, so the collected cells stay valid.
    for location in table_cells(document, document.root()) {
        if !TableCell::new(document, location.cell).is_empty_cell() {
            report.filled_count += 1;
            continue;
        }
        report.empty_count += 1;

        let Some(paragraph) = first_paragraph(document, location.cell) else {
            tracing::debug!("Empty cell {} has no paragraph, left as is", location.cell);
            report.paragraphless += 1;
            continue;
        };
        if is_region_content(document, paragraph) {
            report.already_wrapped += 1;
            continue;
        }

        let id = ids.next_id()?;
        report.regions.push(wrap_in_region(document, paragraph, id)?);
    }
    Ok(report)
}

/// Restrict editing of the document to form fields
pub fn protect_settings(settings: &mut XmlTree) -> Result<usize> {
    DocumentProtection::forms_only().apply(settings)
}

/// Lock a document: wrap empty cells, then protect the settings part
pub fn transform(document: &mut XmlTree, settings: &mut XmlTree, ids: &mut RegionIdAllocator) -> Result<WordReport> {
    let mut report = wrap_empty_cells(document, ids)?;
    report.protections_replaced = protect_settings(settings)?;
    tracing::debug!(
        "Wrapped {} of {} empty cells ({} filled)",
        report.regions.len(),
        report.empty_count,
        report.filled_count
    );
    Ok(report)
}
