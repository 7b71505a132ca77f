//! Document Protection Module
//!
//! Models the `w:documentProtection` setting of a settings part and applies
//! it. A settings part carries at most one protection assertion, so applying
//! a new one removes whatever was there before.

use crate::wordml::{prefix_near, tags, w_name, DEFAULT_PREFIX, W_NS};
use crate::{DocModelError, NodeId, Result, XmlTree};
use serde::{Deserialize, Serialize};

/// Type of document protection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProtectionType {
    /// No protection applied
    #[default]
    None,
    /// Document is read-only (no edits allowed)
    ReadOnly,
    /// Only form fields / content controls can be edited
    FormFieldsOnly,
    /// Only comments can be added
    CommentsOnly,
    /// All changes are tracked (cannot turn off track changes)
    TrackedChangesOnly,
}

impl ProtectionType {
    /// Get the OOXML attribute value for this protection type
    pub fn ooxml_value(&self) -> &'static str {
        match self {
            ProtectionType::None => "none",
            ProtectionType::ReadOnly => "readOnly",
            ProtectionType::FormFieldsOnly => "forms",
            ProtectionType::CommentsOnly => "comments",
            ProtectionType::TrackedChangesOnly => "trackedChanges",
        }
    }

    /// Parse from OOXML attribute value
    pub fn from_ooxml(value: &str) -> Self {
        match value {
            "readOnly" => ProtectionType::ReadOnly,
            "forms" => ProtectionType::FormFieldsOnly,
            "comments" => ProtectionType::CommentsOnly,
            "trackedChanges" => ProtectionType::TrackedChangesOnly,
            _ => ProtectionType::None,
        }
    }
}

/// Document protection configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DocumentProtection {
    /// Type of protection applied
    pub protection_type: ProtectionType,
    /// Whether protection is currently enforced
    pub enforced: bool,
}

impl DocumentProtection {
    /// Create form-fields-only protection
    pub fn forms_only() -> Self {
        Self {
            protection_type: ProtectionType::FormFieldsOnly,
            enforced: true,
        }
    }

    /// Read the first protection assertion of a settings part
    pub fn read(tree: &XmlTree) -> Option<Self> {
        let root = tree.document_element()?;
        let id = protection_elements(tree, root).into_iter().next()?;
        let e = tree.element(id)?;
        let enforced = e
            .attribute_local(tags::ENFORCEMENT)
            .map(parse_on_off)
            .unwrap_or(false);
        let protection_type = e
            .attribute_local(tags::EDIT)
            .map(ProtectionType::from_ooxml)
            .unwrap_or_default();
        Some(Self {
            protection_type,
            enforced,
        })
    }

    /// Replace any protection assertion in a settings part with this one.
    ///
    /// Existing `w:documentProtection` elements are removed wherever they
    /// appear; the new element becomes the first child of the settings root.
    /// Returns the number of assertions removed.
    pub fn apply(&self, tree: &mut XmlTree) -> Result<usize> {
        let root = tree.document_element().ok_or_else(|| {
            DocModelError::TreeStructureError("settings part has no root element".to_string())
        })?;

        let existing = protection_elements(tree, root);
        for &id in &existing {
            tree.detach(id)?;
        }

        let bound = prefix_near(tree, root);
        let prefix = bound.clone().unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        let element = tree.create_element(&w_name(&prefix, tags::DOCUMENT_PROTECTION), Some(W_NS));
        if let Some(e) = tree.element_mut(element) {
            if bound.is_none() {
                e.set_attribute(&format!("xmlns:{}", prefix), W_NS);
            }
            e.set_attribute(&w_name(&prefix, tags::EDIT), self.protection_type.ooxml_value());
            e.set_attribute(&w_name(&prefix, tags::ENFORCEMENT), if self.enforced { "1" } else { "0" });
        }
        tree.insert_child(root, 0, element)?;
        Ok(existing.len())
    }
}

fn protection_elements(tree: &XmlTree, root: NodeId) -> Vec<NodeId> {
    tree.descendants(root)
        .filter(|&id| tree.is_element(id, W_NS, tags::DOCUMENT_PROTECTION))
        .collect()
}

fn parse_on_off(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "on")
}
