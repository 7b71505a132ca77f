//! Document Model - Arena tree for office package XML parts
//!
//! This crate provides the mutable document tree used by the template locker.
//! Every XML part is held as an arena of nodes addressed by index, each node
//! recording its parent and its ordered children, so that a subtree can be
//! moved under a new wrapper without copying.
//!
//! On top of the generic tree it offers the WordprocessingML pieces the
//! locker works with: table/row/cell enumeration, plain-text form-field
//! regions (content controls) and the document protection setting.

mod error;
mod node;
mod node_id;
mod tree;
pub mod wordml;
pub mod table;
pub mod content_control;
pub mod protection;

pub use error::*;
pub use node::*;
pub use node_id::*;
pub use tree::*;
pub use table::*;
pub use content_control::*;
pub use protection::*;
