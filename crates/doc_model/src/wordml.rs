//! WordprocessingML vocabulary used by the locker

use crate::{qualified_name, NodeId, XmlTree};

/// Main WordprocessingML namespace
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Prefix used when a part does not already bind the main namespace
pub const DEFAULT_PREFIX: &str = "w";

/// Local element and attribute names
pub mod tags {
    pub const TABLE: &str = "tbl";
    pub const ROW: &str = "tr";
    pub const CELL: &str = "tc";
    pub const PARAGRAPH: &str = "p";
    pub const RUN: &str = "r";
    pub const TEXT: &str = "t";
    pub const SDT: &str = "sdt";
    pub const SDT_PR: &str = "sdtPr";
    pub const SDT_CONTENT: &str = "sdtContent";
    pub const ID: &str = "id";
    pub const PLAIN_TEXT: &str = "text";
    pub const SETTINGS: &str = "settings";
    pub const DOCUMENT_PROTECTION: &str = "documentProtection";
    pub const VAL: &str = "val";
    pub const EDIT: &str = "edit";
    pub const ENFORCEMENT: &str = "enforcement";
}

/// Prefix to use for new main-namespace elements created next to `near`.
///
/// Taken from `near` when it is itself in the main namespace, otherwise from
/// a declaration on the document element. `None` means the part never binds
/// the namespace and the caller must declare it.
pub fn prefix_near(tree: &XmlTree, near: NodeId) -> Option<String> {
    if let Some(e) = tree.element(near) {
        if e.namespace.as_deref() == Some(W_NS) {
            return Some(e.prefix().unwrap_or("").to_string());
        }
    }
    let root = tree.document_element()?;
    tree.element(root)?
        .declared_prefix_for(W_NS)
        .map(str::to_string)
}

/// Qualified main-namespace name for `local` under `prefix`
pub fn w_name(prefix: &str, local: &str) -> String {
    qualified_name(Some(prefix), local)
}

/// Build an empty `w:settings` part
pub fn empty_settings() -> XmlTree {
    let (mut tree, root) = XmlTree::with_document_element(&w_name(DEFAULT_PREFIX, tags::SETTINGS), Some(W_NS));
    if let Some(e) = tree.element_mut(root) {
        e.set_attribute(&format!("xmlns:{}", DEFAULT_PREFIX), W_NS);
    }
    tree
}
