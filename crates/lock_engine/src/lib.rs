//! Lock Engine - template locking for office documents
//!
//! Cells that already hold content become read-only and empty cells stay
//! editable, so a template can be handed out with only its blanks open:
//! - Word documents: empty table cells become plain-text form fields and the
//!   document is protected for form filling only
//! - Workbooks: empty cells are unlocked, filled cells locked, and the sheet
//!   is protected
//!
//! [`Locker`] dispatches a document by its [`DocumentKind`] and reports how
//! many cells were found empty and filled.

mod error;
mod kind;
mod classify;
pub mod word;
pub mod sheet;
mod locker;

#[cfg(test)]
mod tests;

pub use error::*;
pub use kind::*;
pub use classify::*;
pub use locker::*;
