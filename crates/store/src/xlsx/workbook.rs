//! Workbook part: sheet list and active sheet

use crate::xml::parse_xml;
use crate::{Result, StoreError};

/// A `<sheet>` entry of the workbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    pub name: String,
    /// Relationship id of the sheet part (`r:id`)
    pub rel_id: String,
}

/// What the locker needs from `workbook.xml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookInfo {
    pub sheets: Vec<SheetEntry>,
    /// `bookViews/workbookView@activeTab`, 0 when absent
    pub active_tab: usize,
}

impl WorkbookInfo {
    pub fn parse(content: &[u8]) -> Result<Self> {
        let tree = parse_xml(content)?;
        let root = tree
            .document_element()
            .ok_or_else(|| StoreError::InvalidStructure("workbook has no root".to_string()))?;

        let mut sheets = Vec::new();
        let mut active_tab = None;
        for id in tree.descendants(root) {
            let Some(e) = tree.element(id) else {
                continue;
            };
            match e.local_name() {
                "sheet" => {
                    let name = e.attribute("name").ok_or_else(|| {
                        StoreError::InvalidStructure("sheet without a name".to_string())
                    })?;
                    let rel_id = e.attribute_local("id").ok_or_else(|| {
                        StoreError::InvalidStructure(format!("sheet '{}' without r:id", name))
                    })?;
                    sheets.push(SheetEntry {
                        name: name.to_string(),
                        rel_id: rel_id.to_string(),
                    });
                }
                "workbookView" if active_tab.is_none() => {
                    active_tab = e.attribute("activeTab").and_then(|v| v.parse().ok());
                }
                _ => {}
            }
        }

        Ok(Self {
            sheets,
            active_tab: active_tab.unwrap_or(0),
        })
    }
}
