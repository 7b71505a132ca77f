//! Table, row and cell enumeration over a WordprocessingML body
//!
//! Rows are attributed to their nearest enclosing table and cells to their
//! nearest enclosing row. Walking a table never descends into a nested
//! table, so each cell of the document is reported exactly once even though
//! nested tables are themselves enumerated.

use crate::wordml::{tags, W_NS};
use crate::{NodeId, XmlTree};

/// Position of one table cell in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellLocation {
    pub table: NodeId,
    pub row: NodeId,
    pub cell: NodeId,
}

/// All tables under `scope`, outer before inner, in document order
pub fn tables(tree: &XmlTree, scope: NodeId) -> Vec<NodeId> {
    tree.descendants(scope)
        .filter(|&id| tree.is_element(id, W_NS, tags::TABLE))
        .collect()
}

/// Rows belonging directly to `table`
pub fn rows(tree: &XmlTree, table: NodeId) -> Vec<NodeId> {
    collect_scoped(tree, table, tags::ROW)
}

/// Cells belonging directly to `row`
pub fn cells(tree: &XmlTree, row: NodeId) -> Vec<NodeId> {
    collect_scoped(tree, row, tags::CELL)
}

/// Every table cell under `scope`: table by table, row-major within a table
pub fn table_cells(tree: &XmlTree, scope: NodeId) -> Vec<CellLocation> {
    let mut out = Vec::new();
    for table in tables(tree, scope) {
        for row in rows(tree, table) {
            for cell in cells(tree, row) {
                out.push(CellLocation { table, row, cell });
            }
        }
    }
    out
}

/// First paragraph owned by `cell`, not looking inside nested tables
pub fn first_paragraph(tree: &XmlTree, cell: NodeId) -> Option<NodeId> {
    collect_scoped(tree, cell, tags::PARAGRAPH).into_iter().next()
}

/// Every text fragment (`w:t`) under `node`, at any depth, in document order
pub fn text_fragments(tree: &XmlTree, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.descendants(node)
        .filter(move |&id| tree.is_element(id, W_NS, tags::TEXT))
}

/// Pre-order search for `target` elements that stops at matches and at
/// nested tables
fn collect_scoped(tree: &XmlTree, start: NodeId, target: &str) -> Vec<NodeId> {
    let mut found = Vec::new();
    let mut stack: Vec<NodeId> = tree.children(start).iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        if tree.is_element(id, W_NS, target) {
            found.push(id);
            continue;
        }
        if tree.is_element(id, W_NS, tags::TABLE) {
            continue;
        }
        stack.extend(tree.children(id).iter().rev().copied());
    }
    found
}
