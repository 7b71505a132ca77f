//! Read seam for value-only spreadsheet readers

use crate::{CellValue, GridModel, Result};

/// A value-only view of one worksheet.
///
/// Positions are 0-based, the way legacy readers report them. Readers carry
/// no protection information.
pub trait GridSource {
    /// Name of the worksheet
    fn sheet_name(&self) -> &str;

    /// `(rows, columns)` reported by the reader
    fn dimensions(&self) -> (u32, u32);

    /// Value at a 0-based position; nil outside the reported data
    fn value_at(&self, row: u32, col: u32) -> CellValue;
}

impl GridModel {
    /// Copy a source value by value into a fresh grid, reindexing to 1-based.
    ///
    /// Every position of the reported dimensions becomes a cell with default
    /// protection, so the grid covers exactly the source's extent. Sources
    /// spanning more than `limit` cells are rejected.
    pub fn materialize(source: &dyn GridSource, limit: u64) -> Result<Self> {
        let (rows, cols) = source.dimensions();
        let mut grid = GridModel::with_extent(source.sheet_name(), rows, cols, limit)?;
        for row in 0..rows {
            for col in 0..cols {
                let value = source.value_at(row, col);
                if !value.is_nil() {
                    grid.set_value(row + 1, col + 1, value)?;
                }
            }
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GridError, DEFAULT_CELL_LIMIT};

    struct Fixed {
        rows: Vec<Vec<CellValue>>,
    }

    impl GridSource for Fixed {
        fn sheet_name(&self) -> &str {
            "Legacy"
        }

        fn dimensions(&self) -> (u32, u32) {
            let cols = self.rows.iter().map(Vec::len).max().unwrap_or(0);
            (self.rows.len() as u32, cols as u32)
        }

        fn value_at(&self, row: u32, col: u32) -> CellValue {
            self.rows
                .get(row as usize)
                .and_then(|r| r.get(col as usize))
                .cloned()
                .unwrap_or_default()
        }
    }

    #[test]
    fn test_materialize_reindexes() {
        let source = Fixed {
            rows: vec![
                vec!["A".into(), 1.0.into()],
                vec!["".into()],
            ],
        };
        let grid = GridModel::materialize(&source, DEFAULT_CELL_LIMIT).unwrap();
        assert_eq!(grid.name(), "Legacy");
        assert_eq!(grid.extent(), (2, 2));
        assert_eq!(grid.cell(1, 1).unwrap().value, CellValue::from("A"));
        assert_eq!(grid.cell(1, 2).unwrap().value, CellValue::Number(1.0));
        assert_eq!(grid.cell(2, 1).unwrap().value, CellValue::from(""));
        assert_eq!(grid.cell(2, 2).unwrap().value, CellValue::Empty);
    }

    #[test]
    fn test_materialize_empty_source() {
        let grid = GridModel::materialize(&Fixed { rows: vec![] }, DEFAULT_CELL_LIMIT).unwrap();
        assert_eq!(grid.extent(), (0, 0));
    }

    #[test]
    fn test_materialize_over_limit() {
        let source = Fixed {
            rows: vec![vec![CellValue::Number(1.0); 3]; 3],
        };
        let err = GridModel::materialize(&source, 8).unwrap_err();
        assert!(matches!(err, GridError::ExtentTooLarge { rows: 3, cols: 3, limit: 8 }));
    }
}
