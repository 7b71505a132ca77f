//! Spreadsheet transformer
//!
//! Each cell's lock flag becomes a pure function of its value: empty cells
//! are unlocked, filled cells locked, neither hidden. The sheet is then
//! protected so the flags take effect. Legacy workbooks are materialized
//! into a grid first and go through the same loop.

use crate::classify::Classify;
use grid_model::{CellProtection, GridModel, GridSource, SheetProtection};

/// Outcome of locking one grid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SheetReport {
    pub empty_count: usize,
    pub filled_count: usize,
}

impl SheetReport {
    /// Total cells visited
    pub fn total(&self) -> usize {
        self.empty_count + self.filled_count
    }
}

/// Count empty and filled cells without changing anything
pub fn classify_grid(grid: &GridModel) -> SheetReport {
    let mut report = SheetReport::default();
    for (_, cell) in grid.cells() {
        if cell.value.is_empty_cell() {
            report.empty_count += 1;
        } else {
            report.filled_count += 1;
        }
    }
    report
}

/// Set every cell's protection from its value and enable sheet protection
pub fn transform(grid: &mut GridModel) -> SheetReport {
    let mut report = SheetReport::default();
    for (_, cell) in grid.cells_mut() {
        if cell.value.is_empty_cell() {
            cell.protection = CellProtection::unlocked();
            report.empty_count += 1;
        } else {
            cell.protection = CellProtection::locked();
            report.filled_count += 1;
        }
    }
    grid.set_protection(SheetProtection::enabled());
    tracing::debug!(
        "Locked sheet '{}': {} empty, {} filled",
        grid.name(),
        report.empty_count,
        report.filled_count
    );
    report
}

/// Materialize a value-only source of at most `max_cells` cells and lock it
pub fn transform_source(source: &dyn GridSource, max_cells: u64) -> grid_model::Result<(GridModel, SheetReport)> {
    let mut grid = GridModel::materialize(source, max_cells)?;
    let report = transform(&mut grid);
    Ok((grid, report))
}
