//! Error types for grid model operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GridError {
    /// Row or column outside the addressable sheet
    #[error("Invalid position: row {row}, column {col}")]
    InvalidPosition { row: u32, col: u32 },

    /// A1-style reference that cannot be parsed
    #[error("Invalid cell reference: {0}")]
    InvalidReference(String),

    /// Extent larger than the caller allows
    #[error("Sheet extent {rows}x{cols} exceeds the limit of {limit} cells")]
    ExtentTooLarge { rows: u32, cols: u32, limit: u64 },
}

pub type Result<T> = std::result::Result<T, GridError>;
