//! Dense 1-based grid of cells

use crate::{CellPosition, CellProtection, CellValue, GridError, Result, SheetProtection};

/// Default ceiling on the number of cells a grid built from a file may span
pub const DEFAULT_CELL_LIMIT: u64 = 4_000_000;

/// Reject an extent spanning more than `limit` cells
pub fn check_extent(rows: u32, cols: u32, limit: u64) -> Result<()> {
    if u64::from(rows) * u64::from(cols) > limit {
        return Err(GridError::ExtentTooLarge { rows, cols, limit });
    }
    Ok(())
}

/// One cell of the grid
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridCell {
    pub value: CellValue,
    pub protection: CellProtection,
}

impl GridCell {
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            protection: CellProtection::default(),
        }
    }
}

/// Logical spreadsheet: a rectangle of cells plus sheet protection.
///
/// The rectangle always spans rows `1..=R` and columns `1..=C`; every
/// position inside it holds exactly one [`GridCell`], nil-valued when the
/// source had nothing there.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GridModel {
    name: String,
    rows: Vec<Vec<GridCell>>,
    cols: u32,
    protection: SheetProtection,
}

impl GridModel {
    /// Create an empty grid
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create a grid with a nil-filled extent of at most `limit` cells
    pub fn with_extent(name: impl Into<String>, rows: u32, cols: u32, limit: u64) -> Result<Self> {
        check_extent(rows, cols, limit)?;
        let mut grid = Self::new(name);
        if rows > 0 && cols > 0 {
            grid.ensure_extent(CellPosition::new(rows, cols)?);
        }
        Ok(grid)
    }

    /// Build a grid from row-major values
    pub fn from_rows<I, R, V>(name: impl Into<String>, rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let mut grid = Self::new(name);
        for (r, row) in rows.into_iter().enumerate() {
            for (c, value) in row.into_iter().enumerate() {
                grid.set_value(r as u32 + 1, c as u32 + 1, value)?;
            }
        }
        Ok(grid)
    }

    /// Sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `(rows, columns)` of the populated extent
    pub fn extent(&self) -> (u32, u32) {
        (self.rows.len() as u32, self.cols)
    }

    /// Total number of cells in the extent
    pub fn cell_count(&self) -> usize {
        self.rows.len() * self.cols as usize
    }

    /// Get a cell (1-based)
    pub fn cell(&self, row: u32, col: u32) -> Option<&GridCell> {
        if row == 0 || col == 0 {
            return None;
        }
        self.rows
            .get(row as usize - 1)
            .and_then(|r| r.get(col as usize - 1))
    }

    /// Get a mutable cell (1-based)
    pub fn cell_mut(&mut self, row: u32, col: u32) -> Option<&mut GridCell> {
        if row == 0 || col == 0 {
            return None;
        }
        self.rows
            .get_mut(row as usize - 1)
            .and_then(|r| r.get_mut(col as usize - 1))
    }

    /// Set a value, growing the extent when needed
    pub fn set_value(&mut self, row: u32, col: u32, value: impl Into<CellValue>) -> Result<()> {
        let cell = self.cell_entry(CellPosition::new(row, col)?);
        cell.value = value.into();
        Ok(())
    }

    /// Set protection flags of a cell, growing the extent when needed
    pub fn set_cell_protection(&mut self, row: u32, col: u32, protection: CellProtection) -> Result<()> {
        let cell = self.cell_entry(CellPosition::new(row, col)?);
        cell.protection = protection;
        Ok(())
    }

    /// Row-major iteration over every cell of the extent
    pub fn cells(&self) -> impl Iterator<Item = (CellPosition, &GridCell)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter().enumerate().map(move |(c, cell)| {
                (
                    CellPosition {
                        row: r as u32 + 1,
                        col: c as u32 + 1,
                    },
                    cell,
                )
            })
        })
    }

    /// Row-major mutable iteration over every cell of the extent
    pub fn cells_mut(&mut self) -> impl Iterator<Item = (CellPosition, &mut GridCell)> {
        self.rows.iter_mut().enumerate().flat_map(|(r, row)| {
            row.iter_mut().enumerate().map(move |(c, cell)| {
                (
                    CellPosition {
                        row: r as u32 + 1,
                        col: c as u32 + 1,
                    },
                    cell,
                )
            })
        })
    }

    /// Sheet protection
    pub fn protection(&self) -> &SheetProtection {
        &self.protection
    }

    pub fn set_protection(&mut self, protection: SheetProtection) {
        self.protection = protection;
    }

    fn cell_entry(&mut self, pos: CellPosition) -> &mut GridCell {
        self.ensure_extent(pos);
        &mut self.rows[pos.row as usize - 1][pos.col as usize - 1]
    }

    fn ensure_extent(&mut self, pos: CellPosition) {
        if pos.col > self.cols {
            self.cols = pos.col;
            for row in &mut self.rows {
                row.resize_with(self.cols as usize, GridCell::default);
            }
        }
        while (self.rows.len() as u32) < pos.row {
            self.rows
                .push(std::iter::repeat_with(GridCell::default).take(self.cols as usize).collect());
        }
    }
}
