//! Grid Model - logical spreadsheet representation
//!
//! A [`GridModel`] is a dense, 1-based rectangle of cells, each holding a
//! typed value and its protection flags, plus the sheet-level protection
//! setting. Storage formats read into it through adapters; the legacy
//! binary format goes through the [`GridSource`] seam and is materialized
//! cell by cell.

mod error;
mod grid;
mod protection;
mod reference;
mod source;
mod value;

pub use error::*;
pub use grid::*;
pub use protection::*;
pub use reference::*;
pub use source::*;
pub use value::*;
