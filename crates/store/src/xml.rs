//! XML part parsing and serialization
//!
//! Parts are read into a [`doc_model::XmlTree`] with every node kept, so a
//! part the locker does not touch beyond a few elements is written back with
//! its content intact. Namespaces are resolved while reading and stored on
//! each element; prefixes and declarations stay exactly as written.

use crate::{Result, StoreError};
use doc_model::{Attribute, Element, NodeId, NodeKind, XmlTree};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

/// Declaration written at the top of every serialized part
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Parse an XML part into a tree
pub fn parse_xml(content: &[u8]) -> Result<XmlTree> {
    let mut reader = NsReader::from_reader(content);
    reader.config_mut().trim_text(false);

    let mut tree = XmlTree::new();
    let mut stack: Vec<NodeId> = vec![tree.root()];
    let mut buf = Vec::new();
    let mut seen_root = false;

    loop {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf)?;
        let namespace = namespace_of(&resolved);
        let event = event.into_owned();
        let parent = *stack.last().unwrap_or(&tree.root());
        let at_top = stack.len() == 1;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                if at_top && seen_root {
                    return Err(StoreError::XmlParse("multiple root elements".to_string()));
                }
                seen_root = true;
                let element = read_element(e, namespace)?;
                let id = tree.add(NodeKind::Element(element));
                tree.append_child(parent, id)?;
                if matches!(event, Event::Start(_)) {
                    stack.push(id);
                }
            }
            Event::End(_) => {
                if stack.len() <= 1 {
                    return Err(StoreError::XmlParse("unexpected closing tag".to_string()));
                }
                stack.pop();
            }
            Event::Text(ref t) => {
                let text = t.unescape()?;
                if at_top {
                    if !text.trim().is_empty() {
                        return Err(StoreError::XmlParse("text outside the root element".to_string()));
                    }
                } else {
                    let id = tree.create_text(text.into_owned());
                    tree.append_child(parent, id)?;
                }
            }
            Event::CData(ref c) => {
                let id = tree.add(NodeKind::CData(utf8(c)?));
                tree.append_child(parent, id)?;
            }
            Event::Comment(ref c) => {
                let id = tree.add(NodeKind::Comment(utf8(c)?));
                tree.append_child(parent, id)?;
            }
            Event::PI(ref pi) => {
                let id = tree.add(NodeKind::ProcessingInstruction(utf8(pi)?));
                tree.append_child(parent, id)?;
            }
            Event::DocType(ref d) => {
                let id = tree.add(NodeKind::DocType(utf8(d)?));
                tree.append_child(parent, id)?;
            }
            // The declaration is always rewritten
            Event::Decl(_) => {}
            Event::Eof => break,
        }
        buf.clear();
    }

    if stack.len() > 1 {
        return Err(StoreError::XmlParse("unclosed element at end of input".to_string()));
    }
    if !seen_root {
        return Err(StoreError::XmlParse("no root element".to_string()));
    }
    Ok(tree)
}

fn namespace_of(resolved: &ResolveResult) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    }
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| StoreError::XmlParse(format!("invalid UTF-8: {}", e)))
}

fn read_element(start: &BytesStart, namespace: Option<String>) -> Result<Element> {
    let name = utf8(start.name().as_ref())?;
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let key = utf8(attr.key.as_ref())?;
        let value = attr.unescape_value()?.into_owned();
        attributes.push(Attribute::new(key, value));
    }
    Ok(Element {
        name,
        namespace,
        attributes,
    })
}

/// Serialize a tree as a standalone UTF-8 part
pub fn write_xml(tree: &XmlTree) -> Vec<u8> {
    let mut xml = String::with_capacity(tree.len() * 16);
    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    for &child in tree.children(tree.root()) {
        write_node(tree, child, &mut xml);
    }
    xml.into_bytes()
}

fn write_node(tree: &XmlTree, id: NodeId, xml: &mut String) {
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.kind {
        NodeKind::Document => {
            for &child in node.children() {
                write_node(tree, child, xml);
            }
        }
        NodeKind::Element(element) => {
            xml.push('<');
            xml.push_str(&element.name);
            for attr in &element.attributes {
                xml.push(' ');
                xml.push_str(&attr.name);
                xml.push_str("=\"");
                xml.push_str(&escape_attr(&attr.value));
                xml.push('"');
            }
            if node.children().is_empty() {
                xml.push_str("/>");
            } else {
                xml.push('>');
                for &child in node.children() {
                    write_node(tree, child, xml);
                }
                xml.push_str("</");
                xml.push_str(&element.name);
                xml.push('>');
            }
        }
        NodeKind::Text(text) => xml.push_str(&escape_text(text)),
        NodeKind::CData(text) => {
            xml.push_str("<![CDATA[");
            xml.push_str(text);
            xml.push_str("]]>");
        }
        NodeKind::Comment(text) => {
            xml.push_str("<!--");
            xml.push_str(text);
            xml.push_str("-->");
        }
        NodeKind::ProcessingInstruction(text) => {
            xml.push_str("<?");
            xml.push_str(text);
            xml.push_str("?>");
        }
        NodeKind::DocType(text) => {
            xml.push_str("<!DOCTYPE ");
            xml.push_str(text.trim_start());
            xml.push('>');
        }
    }
}

/// Escape character data, carriage returns as character references
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\r', "&#13;")
}

/// Escape an attribute value for a double-quoted attribute
pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_model::wordml::{tags, W_NS};
    use proptest::prelude::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t xml:space="preserve"> a &amp; b </w:t></w:r></w:p><!-- note --></w:body></w:document>"#;

    #[test]
    fn test_parse_resolves_namespaces() {
        let tree = parse_xml(DOC.as_bytes()).unwrap();
        let root = tree.document_element().unwrap();
        assert!(tree.is_element(root, W_NS, "document"));

        let t = tree
            .descendants(root)
            .find(|&id| tree.is_element(id, W_NS, tags::TEXT))
            .unwrap();
        assert_eq!(tree.text_content(t), " a & b ");
        assert_eq!(tree.element(t).unwrap().attribute("xml:space"), Some("preserve"));
    }

    #[test]
    fn test_write_preserves_content() {
        let tree = parse_xml(DOC.as_bytes()).unwrap();
        let written = String::from_utf8(write_xml(&tree)).unwrap();
        assert_eq!(written, DOC);
    }

    #[test]
    fn test_default_namespace() {
        let xml = r#"<worksheet xmlns="urn:x"><sheetData/></worksheet>"#;
        let tree = parse_xml(xml.as_bytes()).unwrap();
        let root = tree.document_element().unwrap();
        let data = tree.first_child_element(root, "urn:x", "sheetData");
        assert!(data.is_some());
    }

    #[test]
    fn test_unbound_element_has_no_namespace() {
        let tree = parse_xml(b"<a><b/></a>").unwrap();
        let root = tree.document_element().unwrap();
        assert_eq!(tree.element(root).unwrap().namespace, None);
    }

    #[test]
    fn test_malformed_input_rejected() {
        assert!(parse_xml(b"<a><b></a>").is_err());
        assert!(parse_xml(b"<a>").is_err());
        assert!(parse_xml(b"").is_err());
        assert!(parse_xml(b"<a/><b/>").is_err());
        assert!(parse_xml(b"garbage").is_err());
    }

    #[test]
    fn test_escape_round_trip() {
        let (mut tree, root) = XmlTree::with_document_element("a", None);
        tree.element_mut(root).unwrap().set_attribute("v", "x\"<&>\ny");
        let text = tree.create_text("1 < 2 & 3");
        tree.append_child(root, text).unwrap();

        let bytes = write_xml(&tree);
        let parsed = parse_xml(&bytes).unwrap();
        let root = parsed.document_element().unwrap();
        assert_eq!(parsed.element(root).unwrap().attribute("v"), Some("x\"<&>\ny"));
        assert_eq!(parsed.text_content(root), "1 < 2 & 3");
    }

    #[test]
    fn test_carriage_return_written_as_reference() {
        let (mut tree, root) = XmlTree::with_document_element("a", None);
        tree.element_mut(root).unwrap().set_attribute("v", "1\r\n2");
        let text = tree.create_text("line\r\nnext");
        tree.append_child(root, text).unwrap();

        let written = String::from_utf8(write_xml(&tree)).unwrap();
        assert!(!written.contains('\r'));
        assert!(written.contains(r#"<a v="1&#13;&#10;2">line&#13;"#));

        let parsed = parse_xml(written.as_bytes()).unwrap();
        let root = parsed.document_element().unwrap();
        assert_eq!(parsed.text_content(root), "line\r\nnext");
        assert_eq!(parsed.element(root).unwrap().attribute("v"), Some("1\r\n2"));
    }

    proptest! {
        #[test]
        fn prop_write_then_parse_keeps_text_and_attributes(
            text in "[a-z &<>\"'\r\n\t]{1,16}",
            value in "[a-z &<>\"'\r\n\t]{0,16}",
        ) {
            let (mut tree, root) = XmlTree::with_document_element("w:t", Some(W_NS));
            tree.element_mut(root).unwrap().set_attribute("xmlns:w", W_NS);
            tree.element_mut(root).unwrap().set_attribute("w:val", value.clone());
            let id = tree.create_text(text.clone());
            tree.append_child(root, id).unwrap();

            let written = write_xml(&tree);
            prop_assert!(!written.contains(&b'\r'));

            let parsed = parse_xml(&written).unwrap();
            let root = parsed.document_element().unwrap();
            prop_assert!(parsed.is_element(root, W_NS, tags::TEXT));
            prop_assert_eq!(parsed.text_content(root), text);
            prop_assert_eq!(parsed.element(root).unwrap().attribute("w:val"), Some(value.as_str()));
        }
    }
}
