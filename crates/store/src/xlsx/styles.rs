//! Cell formats and their protection flags
//!
//! A cell's lock and hidden flags live in its cell format
//! (`cellXfs/xf/protection`), shared by every cell using the same style
//! index. Giving one cell new flags therefore means deriving a new format:
//! a copy of the cell's current one with only the protection changed.

use super::SML_NS;
use crate::xml::{parse_xml, write_xml};
use crate::{Result, StoreError};
use doc_model::{qualified_name, NodeId, XmlTree};
use grid_model::CellProtection;
use std::collections::HashMap;

/// Stylesheet with a single default format, for workbooks that have none
pub const MINIMAL_STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

/// Elements that precede `cellXfs` in a stylesheet
const BEFORE_CELL_XFS: [&str; 5] = ["numFmts", "fonts", "fills", "borders", "cellStyleXfs"];

/// The styles part of a workbook
#[derive(Debug, Clone)]
pub struct StyleSheet {
    tree: XmlTree,
    namespace: String,
    cell_xfs: NodeId,
    /// `xf` children of `cellXfs`, by format index
    formats: Vec<NodeId>,
    /// `(base format, protection)` -> derived format index
    derived: HashMap<(u32, CellProtection), u32>,
}

impl StyleSheet {
    /// Parse a styles part
    pub fn parse(content: &[u8]) -> Result<Self> {
        Self::from_tree(parse_xml(content)?)
    }

    /// A stylesheet holding only the default format
    pub fn minimal() -> Result<Self> {
        Self::parse(MINIMAL_STYLES.as_bytes())
    }

    fn from_tree(mut tree: XmlTree) -> Result<Self> {
        let root = tree
            .document_element()
            .ok_or_else(|| StoreError::InvalidStructure("styles part has no root".to_string()))?;
        let element = tree.element(root).ok_or_else(|| {
            StoreError::InvalidStructure("styles part has no root".to_string())
        })?;
        if element.local_name() != "styleSheet" {
            return Err(StoreError::InvalidStructure(format!(
                "expected styleSheet, found {}",
                element.name
            )));
        }
        let namespace = element.namespace.clone().unwrap_or_else(|| SML_NS.to_string());
        let prefix = element.prefix().map(str::to_string);

        let cell_xfs = match tree.first_child_element(root, &namespace, "cellXfs") {
            Some(id) => id,
            None => {
                // A stylesheet without cell formats still implies format 0
                let cell_xfs = tree.create_element(&qualified_name(prefix.as_deref(), "cellXfs"), Some(&namespace));
                let xf = default_xf(&mut tree, prefix.as_deref(), &namespace);
                tree.append_child(cell_xfs, xf)?;
                let index = tree
                    .children(root)
                    .iter()
                    .rposition(|&c| {
                        tree.element(c)
                            .is_some_and(|e| BEFORE_CELL_XFS.contains(&e.local_name()))
                    })
                    .map(|i| i + 1)
                    .unwrap_or(0);
                tree.insert_child(root, index, cell_xfs)?;
                cell_xfs
            }
        };

        let formats = tree.child_elements(cell_xfs, &namespace, "xf").collect();
        let mut sheet = Self {
            tree,
            namespace,
            cell_xfs,
            formats,
            derived: HashMap::new(),
        };
        sheet.update_count();
        Ok(sheet)
    }

    /// Number of cell formats
    pub fn xf_count(&self) -> u32 {
        self.formats.len() as u32
    }

    /// Protection flags of a cell format; unknown indices get the defaults
    pub fn protection(&self, xf: u32) -> CellProtection {
        let Some(&node) = self.formats.get(xf as usize) else {
            return CellProtection::default();
        };
        let Some(protection) = self.tree.first_child_element(node, &self.namespace, "protection") else {
            return CellProtection::default();
        };
        let Some(e) = self.tree.element(protection) else {
            return CellProtection::default();
        };
        CellProtection {
            locked: e.attribute("locked").map(parse_bool).unwrap_or(true),
            hidden: e.attribute("hidden").map(parse_bool).unwrap_or(false),
        }
    }

    /// Index of a format equal to `base` except for its protection.
    ///
    /// `base` itself is returned when it already carries the flags. Derived
    /// formats are appended once and reused for later cells.
    pub fn xf_with_protection(&mut self, base: u32, protection: CellProtection) -> Result<u32> {
        let base = if base < self.xf_count() { base } else { 0 };
        if self.protection(base) == protection {
            return Ok(base);
        }
        if let Some(&index) = self.derived.get(&(base, protection)) {
            return Ok(index);
        }

        let prefix = self.prefix();
        let xf = match self.formats.get(base as usize) {
            Some(&node) => self.tree.deep_clone(node)?,
            None => default_xf(&mut self.tree, prefix.as_deref(), &self.namespace),
        };

        let old: Vec<NodeId> = self
            .tree
            .child_elements(xf, &self.namespace, "protection")
            .collect();
        for id in old {
            self.tree.detach(id)?;
        }

        let element = self
            .tree
            .create_element(&qualified_name(prefix.as_deref(), "protection"), Some(&self.namespace));
        if let Some(e) = self.tree.element_mut(element) {
            e.set_attribute("locked", if protection.locked { "1" } else { "0" });
            if protection.hidden {
                e.set_attribute("hidden", "1");
            }
        }
        let index = self
            .tree
            .children(xf)
            .iter()
            .position(|&c| self.tree.is_element(c, &self.namespace, "extLst"))
            .unwrap_or(self.tree.children(xf).len());
        self.tree.insert_child(xf, index, element)?;
        if let Some(e) = self.tree.element_mut(xf) {
            e.set_attribute("applyProtection", "1");
        }

        self.tree.append_child(self.cell_xfs, xf)?;
        self.formats.push(xf);
        let index = self.xf_count() - 1;
        self.update_count();
        self.derived.insert((base, protection), index);
        tracing::debug!("Derived cell format {} from {}", index, base);
        Ok(index)
    }

    /// Serialize the styles part
    pub fn to_xml(&self) -> Vec<u8> {
        write_xml(&self.tree)
    }

    fn prefix(&self) -> Option<String> {
        self.tree
            .element(self.cell_xfs)
            .and_then(|e| e.prefix())
            .map(str::to_string)
    }

    fn update_count(&mut self) {
        let count = self.xf_count();
        if let Some(e) = self.tree.element_mut(self.cell_xfs) {
            e.set_attribute("count", count.to_string());
        }
    }
}

fn default_xf(tree: &mut XmlTree, prefix: Option<&str>, namespace: &str) -> NodeId {
    let xf = tree.create_element(&qualified_name(prefix, "xf"), Some(namespace));
    if let Some(e) = tree.element_mut(xf) {
        for attr in ["numFmtId", "fontId", "fillId", "borderId", "xfId"] {
            e.set_attribute(attr, "0");
        }
    }
    xf
}

pub(crate) fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true")
}
