//! Document tree storage and structural operations

use crate::{DocModelError, Element, NodeId, NodeKind, Result, XmlNode};

/// An XML part held as an arena of nodes.
///
/// Index 0 is always the synthetic [`NodeKind::Document`] root. Nodes are
/// appended to the arena and never removed; detaching a node only unlinks
/// it from its parent, so outstanding ids remain valid.
#[derive(Debug, Clone)]
pub struct XmlTree {
    nodes: Vec<XmlNode>,
}

impl Default for XmlTree {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlTree {
    /// Create an empty tree holding only the document root
    pub fn new() -> Self {
        Self {
            nodes: vec![XmlNode::new(NodeKind::Document)],
        }
    }

    /// Create a tree whose document element is a fresh element
    pub fn with_document_element(name: &str, namespace: Option<&str>) -> (Self, NodeId) {
        let mut tree = Self::new();
        let element = tree.create_element(name, namespace);
        // A fresh node under the root cannot fail to attach
        tree.nodes[element.index()].parent = Some(tree.root());
        tree.nodes[0].children.push(element);
        (tree, element)
    }

    /// The synthetic document root
    pub fn root(&self) -> NodeId {
        NodeId::from_index(0)
    }

    /// The single top-level element of the part
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&id| self.element(id).is_some())
    }

    /// Number of nodes in the arena, including detached ones
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds nothing but the root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Get a node by id
    pub fn get(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id.index())
    }

    /// Get a node by id, failing when it does not exist
    pub fn node(&self, id: NodeId) -> Result<&XmlNode> {
        self.get(id).ok_or(DocModelError::NodeNotFound(id))
    }

    /// Get an element payload
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.get(id).and_then(XmlNode::as_element)
    }

    /// Get a mutable element payload
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id.index()).map(|n| &mut n.kind) {
            Some(NodeKind::Element(e)) => Some(e),
            _ => None,
        }
    }

    /// Check whether a node is an element with the given namespace and local name
    pub fn is_element(&self, id: NodeId, namespace: &str, local: &str) -> bool {
        self.element(id).is_some_and(|e| e.is(namespace, local))
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Ordered children of a node (empty for unknown ids)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Position of a node among its parent's children
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Add a detached node to the arena
    pub fn add(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(XmlNode::new(kind));
        id
    }

    /// Add a detached element to the arena
    pub fn create_element(&mut self, name: &str, namespace: Option<&str>) -> NodeId {
        self.add(NodeKind::Element(Element::new(name, namespace)))
    }

    /// Add a detached text node to the arena
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.add(NodeKind::Text(text.into()))
    }

    /// Append a detached node as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let index = self.node(parent)?.children.len();
        self.insert_child(parent, index, child)
    }

    /// Insert a detached node at `index` among the children of `parent`
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) -> Result<()> {
        self.check_attachable(parent, child)?;
        let siblings = &mut self.nodes[parent.index()].children;
        if index > siblings.len() {
            return Err(DocModelError::InvalidOperation(format!(
                "index {} out of bounds for {} children of {}",
                index,
                siblings.len(),
                parent
            )));
        }
        siblings.insert(index, child);
        self.nodes[child.index()].parent = Some(parent);
        Ok(())
    }

    /// Unlink a node from its parent, returning the position it occupied
    pub fn detach(&mut self, id: NodeId) -> Result<usize> {
        let parent = self
            .node(id)?
            .parent
            .ok_or_else(|| DocModelError::InvalidOperation(format!("{} has no parent", id)))?;
        let index = self
            .index_in_parent(id)
            .ok_or_else(|| DocModelError::TreeStructureError(format!("{} missing from its parent", id)))?;
        self.nodes[parent.index()].children.remove(index);
        self.nodes[id.index()].parent = None;
        Ok(index)
    }

    /// Pre-order iterator over the descendants of `id` (excluding `id`)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }

    /// Direct child elements matching namespace and local name
    pub fn child_elements<'a>(
        &'a self,
        parent: NodeId,
        namespace: &'a str,
        local: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(parent)
            .iter()
            .copied()
            .filter(move |&c| self.is_element(c, namespace, local))
    }

    /// First direct child element matching namespace and local name
    pub fn first_child_element(&self, parent: NodeId, namespace: &str, local: &str) -> Option<NodeId> {
        self.child_elements(parent, namespace, local).next()
    }

    /// Concatenated text and CDATA content of all descendants, in document order
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|d| self.get(d).and_then(XmlNode::text))
            .collect()
    }

    /// Copy a subtree; the copy is returned detached
    pub fn deep_clone(&mut self, id: NodeId) -> Result<NodeId> {
        let kind = self.node(id)?.kind.clone();
        let copy = self.add(kind);
        let children = self.children(id).to_vec();
        for child in children {
            let child_copy = self.deep_clone(child)?;
            self.nodes[copy.index()].children.push(child_copy);
            self.nodes[child_copy.index()].parent = Some(copy);
        }
        Ok(copy)
    }

    /// Whether `ancestor` is a proper ancestor of `id`
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    fn check_attachable(&self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_node = self.node(parent)?;
        if !matches!(parent_node.kind, NodeKind::Document | NodeKind::Element(_)) {
            return Err(DocModelError::NotAnElement(parent));
        }
        if self.node(child)?.parent.is_some() {
            return Err(DocModelError::AlreadyAttached(child));
        }
        if child == self.root() {
            return Err(DocModelError::InvalidOperation("the root cannot be attached".to_string()));
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(DocModelError::TreeStructureError(format!(
                "{} cannot become a child of its descendant {}",
                child, parent
            )));
        }
        Ok(())
    }
}

/// Pre-order traversal produced by [`XmlTree::descendants`]
pub struct Descendants<'a> {
    tree: &'a XmlTree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
