//! Cell positions and A1-style references

use crate::{GridError, Result};

/// Largest row index of a worksheet
pub const MAX_ROWS: u32 = 1_048_576;
/// Largest column index of a worksheet (`XFD`)
pub const MAX_COLS: u32 = 16_384;

/// 1-based cell position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellPosition {
    pub row: u32,
    pub col: u32,
}

impl CellPosition {
    /// Create a position, checking it is on the sheet
    pub fn new(row: u32, col: u32) -> Result<Self> {
        if row == 0 || col == 0 || row > MAX_ROWS || col > MAX_COLS {
            return Err(GridError::InvalidPosition { row, col });
        }
        Ok(Self { row, col })
    }

    /// Parse an A1-style reference such as `B12` (absolute markers allowed)
    pub fn parse_a1(reference: &str) -> Result<Self> {
        let invalid = || GridError::InvalidReference(reference.to_string());
        let cleaned: String = reference.chars().filter(|&c| c != '$').collect();
        let split = cleaned
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (letters, digits) = cleaned.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }
        let col = column_index(letters).ok_or_else(invalid)?;
        let row: u32 = digits.parse().map_err(|_| invalid())?;
        Self::new(row, col).map_err(|_| invalid())
    }

    /// Format as an A1-style reference
    pub fn to_a1(&self) -> String {
        format!("{}{}", column_letters(self.col), self.row)
    }
}

impl std::fmt::Display for CellPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Column letters for a 1-based column index (`1` -> `A`, `27` -> `AA`)
pub fn column_letters(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = ((col - 1) % 26) as u8;
        letters.push(b'A' + rem);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// 1-based column index for column letters, case-insensitive
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() || letters.len() > 3 {
        return None;
    }
    letters.chars().try_fold(0u32, |acc, c| {
        let c = c.to_ascii_uppercase();
        if !c.is_ascii_uppercase() {
            return None;
        }
        Some(acc * 26 + (c as u32 - 'A' as u32 + 1))
    })
}
