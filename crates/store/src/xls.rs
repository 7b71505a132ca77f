//! Legacy XLS reader
//!
//! Binary workbooks carry no usable protection information for the locker,
//! so this reader is value-only: it exposes the first sheet through
//! [`GridSource`] and the grid is materialized from it before locking.

use crate::{Result, StoreError};
use calamine::{Data, Range, Reader, Xls};
use grid_model::{CellValue, GridSource};
use std::io::Cursor;

/// First worksheet of an XLS workbook
#[derive(Debug, Clone)]
pub struct XlsSheet {
    name: String,
    range: Range<Data>,
}

impl XlsSheet {
    /// Decode the first sheet of an XLS file
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let mut workbook: Xls<_> = Xls::new(Cursor::new(bytes))?;

        let name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| StoreError::Xls("Workbook has no sheets".to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| StoreError::Xls(format!("Failed to read sheet '{}'", name)))??;

        tracing::debug!("Read legacy sheet '{}' ({:?})", name, range.end());
        Ok(Self { name, range })
    }

    /// Build a sheet from an already decoded range
    pub fn from_range(name: impl Into<String>, range: Range<Data>) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }
}

impl GridSource for XlsSheet {
    fn sheet_name(&self) -> &str {
        &self.name
    }

    /// Rows and columns counted from A1 up to the last used cell
    fn dimensions(&self) -> (u32, u32) {
        match self.range.end() {
            Some((row, col)) if !self.range.is_empty() => (row + 1, col + 1),
            _ => (0, 0),
        }
    }

    fn value_at(&self, row: u32, col: u32) -> CellValue {
        self.range
            .get_value((row, col))
            .map(data_to_value)
            .unwrap_or_default()
    }
}

/// Convert a decoded cell to a grid value
fn data_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Float(n) => CellValue::Number(*n),
        Data::Bool(b) => CellValue::Boolean(*b),
        // Dates stay serial numbers, the way the workbook stores them
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_model::{GridModel, DEFAULT_CELL_LIMIT};

    /// Two sheets; the first, "Form", leaves row 1 blank and fills A2:C3
    const LEGACY_FORM: &[u8] = include_bytes!("../../../fixtures/xls/legacy_form.xls");

    fn sample_range() -> Range<Data> {
        let mut range = Range::new((0, 0), (1, 1));
        range.set_value((0, 0), Data::String("A".to_string()));
        range.set_value((0, 1), Data::Int(1));
        range.set_value((1, 0), Data::String(String::new()));
        range
    }

    #[test]
    fn test_dimensions_and_values() {
        let sheet = XlsSheet::from_range("Sheet1", sample_range());
        assert_eq!(sheet.dimensions(), (2, 2));
        assert_eq!(sheet.value_at(0, 0), CellValue::from("A"));
        assert_eq!(sheet.value_at(0, 1), CellValue::Number(1.0));
        assert_eq!(sheet.value_at(1, 0), CellValue::from(""));
        assert_eq!(sheet.value_at(1, 1), CellValue::Empty);
        assert_eq!(sheet.value_at(5, 5), CellValue::Empty);
    }

    #[test]
    fn test_range_not_starting_at_origin() {
        let mut range = Range::new((2, 1), (2, 1));
        range.set_value((2, 1), Data::Float(0.0));
        let sheet = XlsSheet::from_range("S", range);
        assert_eq!(sheet.dimensions(), (3, 2));
        assert_eq!(sheet.value_at(0, 0), CellValue::Empty);
        assert_eq!(sheet.value_at(2, 1), CellValue::Number(0.0));
    }

    #[test]
    fn test_empty_range() {
        let sheet = XlsSheet::from_range("S", Range::empty());
        assert_eq!(sheet.dimensions(), (0, 0));
    }

    #[test]
    fn test_materialize() {
        let sheet = XlsSheet::from_range("Sheet1", sample_range());
        let grid = GridModel::materialize(&sheet, DEFAULT_CELL_LIMIT).unwrap();
        assert_eq!(grid.extent(), (2, 2));
        assert_eq!(grid.cell(1, 2).unwrap().value, CellValue::Number(1.0));
    }

    #[test]
    fn test_data_conversion() {
        assert_eq!(data_to_value(&Data::Bool(false)), CellValue::Boolean(false));
        assert_eq!(
            data_to_value(&Data::Error(calamine::CellErrorType::Div0)),
            CellValue::Error("#DIV/0!".to_string())
        );
        assert_eq!(
            data_to_value(&Data::DateTimeIso("2024-01-01".to_string())),
            CellValue::from("2024-01-01")
        );
    }

    #[test]
    fn test_open_reads_first_sheet() {
        let sheet = XlsSheet::open(LEGACY_FORM).unwrap();
        assert_eq!(sheet.sheet_name(), "Form");
        // the used range starts on row 2, the extent still counts from A1
        assert_eq!(sheet.dimensions(), (3, 3));

        assert_eq!(sheet.value_at(0, 0), CellValue::Empty);
        assert_eq!(sheet.value_at(1, 0), CellValue::from("Name:"));
        // B2 holds an empty shared string, which may come back as nothing
        let b2 = sheet.value_at(1, 1);
        assert!(b2.is_nil() || b2.as_text() == Some(""), "{:?}", b2);
        assert_eq!(sheet.value_at(1, 2), CellValue::Number(42.5));
        assert_eq!(sheet.value_at(2, 0), CellValue::Boolean(true));
        assert_eq!(sheet.value_at(2, 1), CellValue::from("  "));
        assert_eq!(sheet.value_at(2, 2), CellValue::Number(0.0));
    }

    #[test]
    fn test_open_rejects_garbage() {
        assert!(XlsSheet::open(b"not a compound file").is_err());
    }
}
