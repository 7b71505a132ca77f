//! Empty/filled classification of cells
//!
//! A cell is empty when it shows no text. Only blank-or-missing text counts
//! as empty; any non-text value (including the number zero) is content.

use doc_model::{table::text_fragments, NodeId, XmlTree};
use grid_model::CellValue;

/// Verdict for one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellClass {
    Empty,
    Filled,
}

impl CellClass {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellClass::Empty)
    }

    fn from_empty(empty: bool) -> Self {
        if empty {
            CellClass::Empty
        } else {
            CellClass::Filled
        }
    }
}

/// Something the classifier can judge
pub trait Classify {
    fn classify(&self) -> CellClass;

    fn is_empty_cell(&self) -> bool {
        self.classify().is_empty()
    }
}

/// A table cell of a word-processing document
#[derive(Debug, Clone, Copy)]
pub struct TableCell<'a> {
    pub tree: &'a XmlTree,
    pub cell: NodeId,
}

impl<'a> TableCell<'a> {
    pub fn new(tree: &'a XmlTree, cell: NodeId) -> Self {
        Self { tree, cell }
    }

    /// All text fragments of the cell joined in document order
    pub fn text(&self) -> String {
        text_fragments(self.tree, self.cell)
            .map(|t| self.tree.text_content(t))
            .collect()
    }
}

impl Classify for TableCell<'_> {
    fn classify(&self) -> CellClass {
        CellClass::from_empty(is_blank(&self.text()))
    }
}

impl Classify for CellValue {
    fn classify(&self) -> CellClass {
        let empty = match self {
            CellValue::Empty => true,
            CellValue::Text(s) => is_blank(s),
            CellValue::Number(_)
            | CellValue::Boolean(_)
            | CellValue::Error(_)
            | CellValue::Formula(_) => false,
        };
        CellClass::from_empty(empty)
    }
}

/// Whether text is empty once surrounding whitespace is stripped
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
