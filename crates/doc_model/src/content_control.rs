//! Form-Field Regions - plain-text content controls (SDT)
//!
//! A region wraps one block-level paragraph so that it stays editable while
//! the rest of the document is protected for forms only. In OOXML it is
//! written as:
//!
//! ```xml
//! <w:sdt>
//!   <w:sdtPr><w:id w:val="1000000"/><w:text/></w:sdtPr>
//!   <w:sdtContent><w:p>...</w:p></w:sdtContent>
//! </w:sdt>
//! ```

use crate::wordml::{prefix_near, tags, w_name, DEFAULT_PREFIX, W_NS};
use crate::{DocModelError, NodeId, Result, XmlTree};
use serde::{Deserialize, Serialize};

/// First identifier handed out when no other base is configured
pub const DEFAULT_REGION_ID_BASE: u32 = 1_000_000;

/// Hands out region identifiers for one document.
///
/// Identifiers increase by one per call, starting at the base. One allocator
/// lives for one request, so concurrent requests never share a counter.
#[derive(Debug, Clone)]
pub struct RegionIdAllocator {
    base: u32,
    next: u32,
}

impl Default for RegionIdAllocator {
    fn default() -> Self {
        Self::new(DEFAULT_REGION_ID_BASE)
    }
}

impl RegionIdAllocator {
    pub fn new(base: u32) -> Self {
        Self { base, next: base }
    }

    /// Next unused identifier
    pub fn next_id(&mut self) -> Result<u32> {
        let id = self.next;
        self.next = id.checked_add(1).ok_or_else(|| {
            DocModelError::InvalidOperation("region identifier space exhausted".to_string())
        })?;
        Ok(id)
    }

    /// Number of identifiers handed out so far
    pub fn issued(&self) -> u32 {
        self.next - self.base
    }

    pub fn base(&self) -> u32 {
        self.base
    }
}

/// A region inserted into the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFieldRegion {
    /// Value of `w:sdtPr/w:id/@w:val`
    pub id: u32,
    /// The `w:sdt` element
    pub node: NodeId,
    /// The wrapped paragraph
    pub paragraph: NodeId,
}

/// Whether `paragraph` already sits directly inside a content control
pub fn is_region_content(tree: &XmlTree, paragraph: NodeId) -> bool {
    tree.parent(paragraph)
        .is_some_and(|p| tree.is_element(p, W_NS, tags::SDT_CONTENT))
}

/// Move `paragraph` into a new plain-text region with identifier `id`.
///
/// The region takes the paragraph's old position among its parent's
/// children; the following siblings keep their relative order.
pub fn wrap_in_region(tree: &mut XmlTree, paragraph: NodeId, id: u32) -> Result<FormFieldRegion> {
    if !tree.is_element(paragraph, W_NS, tags::PARAGRAPH) {
        return Err(DocModelError::InvalidOperation(format!(
            "{} is not a paragraph",
            paragraph
        )));
    }
    let parent = tree
        .parent(paragraph)
        .ok_or_else(|| DocModelError::InvalidOperation(format!("{} is detached", paragraph)))?;
    let prefix = prefix_near(tree, paragraph).unwrap_or_else(|| DEFAULT_PREFIX.to_string());

    let sdt = tree.create_element(&w_name(&prefix, tags::SDT), Some(W_NS));
    let sdt_pr = tree.create_element(&w_name(&prefix, tags::SDT_PR), Some(W_NS));
    let id_el = tree.create_element(&w_name(&prefix, tags::ID), Some(W_NS));
    if let Some(e) = tree.element_mut(id_el) {
        e.set_attribute(&w_name(&prefix, tags::VAL), id.to_string());
    }
    let text_el = tree.create_element(&w_name(&prefix, tags::PLAIN_TEXT), Some(W_NS));
    let content = tree.create_element(&w_name(&prefix, tags::SDT_CONTENT), Some(W_NS));

    tree.append_child(sdt_pr, id_el)?;
    tree.append_child(sdt_pr, text_el)?;
    tree.append_child(sdt, sdt_pr)?;
    tree.append_child(sdt, content)?;

    let index = tree.detach(paragraph)?;
    tree.append_child(content, paragraph)?;
    tree.insert_child(parent, index, sdt)?;

    Ok(FormFieldRegion {
        id,
        node: sdt,
        paragraph,
    })
}

/// Read the identifier of a region element
pub fn region_id(tree: &XmlTree, sdt: NodeId) -> Option<u32> {
    let pr = tree.first_child_element(sdt, W_NS, tags::SDT_PR)?;
    let id = tree.first_child_element(pr, W_NS, tags::ID)?;
    tree.element(id)?.attribute_local(tags::VAL)?.parse().ok()
}
