//! Node kinds stored in the arena

use crate::NodeId;

/// Enumeration of all node kinds in an XML part
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Synthetic root holding the document element and any top-level
    /// comments or processing instructions
    Document,
    Element(Element),
    /// Character data, stored unescaped
    Text(String),
    CData(String),
    /// Raw comment body, without the `<!--` `-->` delimiters
    Comment(String),
    /// Raw processing instruction body, without `<?` `?>`
    ProcessingInstruction(String),
    /// Raw doctype body, without `<!DOCTYPE` `>`
    DocType(String),
}

/// An attribute with its qualified name and unescaped value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An element node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written in the source (e.g. `w:tc`)
    pub name: String,
    /// Resolved namespace URI, if the element is bound to one
    pub namespace: Option<String>,
    /// Attributes in source order
    pub attributes: Vec<Attribute>,
}

impl Element {
    /// Create an element with no attributes
    pub fn new(name: impl Into<String>, namespace: Option<&str>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.map(str::to_string),
            attributes: Vec::new(),
        }
    }

    /// Local part of the qualified name
    pub fn local_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    /// Prefix of the qualified name, if any
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Check namespace and local name
    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local_name() == local
    }

    /// Get an attribute value by qualified name
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Get an attribute by local name, ignoring any prefix
    pub fn attribute_local(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == local || a.name.rsplit_once(':').map(|(_, l)| l) == Some(local))
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    /// Remove an attribute, returning its value
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(index).value)
    }

    /// Find the prefix declared on this element for a namespace URI.
    ///
    /// Returns `Some("")` when the namespace is the default namespace.
    pub fn declared_prefix_for(&self, namespace: &str) -> Option<&str> {
        self.attributes.iter().find_map(|a| {
            if a.value != namespace {
                return None;
            }
            if a.name == "xmlns" {
                Some("")
            } else {
                a.name.strip_prefix("xmlns:")
            }
        })
    }
}

/// A node slot in the arena
#[derive(Debug, Clone)]
pub struct XmlNode {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub kind: NodeKind,
}

impl XmlNode {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            kind,
        }
    }

    /// Parent of this node (None for the root and for detached nodes)
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Ordered children
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Element payload, if this is an element
    pub fn as_element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Text payload for text and CDATA nodes
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(t) | NodeKind::CData(t) => Some(t),
            _ => None,
        }
    }
}

/// Build a qualified name from an optional prefix and a local name
pub fn qualified_name(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(p) if !p.is_empty() => format!("{}:{}", p, local),
        _ => local.to_string(),
    }
}
