//! Shared string table

use crate::xml::parse_xml;
use crate::Result;
use doc_model::{NodeId, XmlTree};

/// Visible text of a string item (`si` or `is`): every `t` except the
/// phonetic runs under `rPh`
pub(crate) fn item_text(tree: &XmlTree, item: NodeId) -> String {
    let mut text = String::new();
    collect_text(tree, item, &mut text);
    text
}

fn collect_text(tree: &XmlTree, node: NodeId, out: &mut String) {
    for &child in tree.children(node) {
        let Some(e) = tree.element(child) else {
            continue;
        };
        match e.local_name() {
            "rPh" => {}
            "t" => out.push_str(&tree.text_content(child)),
            _ => collect_text(tree, child, out),
        }
    }
}

/// Parse `sharedStrings.xml` into its strings, in index order
pub fn parse_shared_strings(content: &[u8]) -> Result<Vec<String>> {
    let tree = parse_xml(content)?;
    let Some(root) = tree.document_element() else {
        return Ok(Vec::new());
    };
    let strings = tree
        .children(root)
        .iter()
        .copied()
        .filter(|&c| tree.element(c).is_some_and(|e| e.local_name() == "si"))
        .map(|si| item_text(&tree, si))
        .collect();
    Ok(strings)
}
