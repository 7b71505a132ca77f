//! Worksheet part: cell grid read and protection write-back

use super::shared_strings::item_text;
use super::styles::{parse_bool, StyleSheet};
use super::SML_NS;
use crate::xml::{parse_xml, write_xml};
use crate::{Result, StoreError};
use doc_model::{qualified_name, NodeId, XmlTree};
use grid_model::{CellPosition, CellValue, GridModel, SheetProtection};
use std::collections::BTreeMap;

/// Elements that precede `sheetData` in a worksheet
const BEFORE_SHEET_DATA: [&str; 5] = ["sheetPr", "dimension", "sheetViews", "sheetFormatPr", "cols"];

/// Elements that `sheetProtection` follows
const BEFORE_SHEET_PROTECTION: [&str; 2] = ["sheetData", "sheetCalcPr"];

/// A `<c>` element read from the sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetCell {
    pub position: CellPosition,
    pub node: NodeId,
    /// Style index (`s`), 0 when absent
    pub style: u32,
    pub value: CellValue,
}

/// A parsed worksheet part
#[derive(Debug, Clone)]
pub struct Worksheet {
    tree: XmlTree,
    namespace: String,
    root: NodeId,
    sheet_data: NodeId,
}

impl Worksheet {
    pub fn parse(content: &[u8]) -> Result<Self> {
        let mut tree = parse_xml(content)?;
        let root = tree
            .document_element()
            .ok_or_else(|| StoreError::InvalidStructure("worksheet has no root".to_string()))?;
        let (namespace, prefix) = match tree.element(root) {
            Some(e) if e.local_name() == "worksheet" => (
                e.namespace.clone().unwrap_or_else(|| SML_NS.to_string()),
                e.prefix().map(str::to_string),
            ),
            Some(e) => {
                return Err(StoreError::InvalidStructure(format!(
                    "expected worksheet, found {}",
                    e.name
                )))
            }
            None => return Err(StoreError::InvalidStructure("worksheet has no root".to_string())),
        };

        let sheet_data = match tree.first_child_element(root, &namespace, "sheetData") {
            Some(id) => id,
            None => {
                let id = tree.create_element(&qualified_name(prefix.as_deref(), "sheetData"), Some(&namespace));
                let index = insertion_after(&tree, root, &BEFORE_SHEET_DATA);
                tree.insert_child(root, index, id)?;
                id
            }
        };

        Ok(Self {
            tree,
            namespace,
            root,
            sheet_data,
        })
    }

    /// A worksheet with an empty `sheetData`
    pub fn blank() -> Result<Self> {
        Self::parse(
            br#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheetData/></worksheet>"#,
        )
    }

    /// Every `<c>` element with its position, style and decoded value
    pub fn cells(&self, shared_strings: &[String]) -> Result<Vec<SheetCell>> {
        let mut cells = Vec::new();
        let mut row_num = 0u32;

        for row in self.rows() {
            row_num = self.explicit_index(row)?.unwrap_or(row_num + 1);
            let mut col = 0u32;
            for node in self.row_cells(row) {
                let position = match self.tree.element(node).and_then(|e| e.attribute("r")) {
                    Some(r) => CellPosition::parse_a1(r)?,
                    None => CellPosition::new(row_num, col + 1)?,
                };
                col = position.col;
                let style = match self.tree.element(node).and_then(|e| e.attribute("s")) {
                    Some(s) => s.parse().map_err(|_| {
                        StoreError::InvalidStructure(format!("bad style index '{}' at {}", s, position))
                    })?,
                    None => 0,
                };
                let value = self.decode_value(node, position, shared_strings)?;
                cells.push(SheetCell {
                    position,
                    node,
                    style,
                    value,
                });
            }
        }
        Ok(cells)
    }

    /// Build the grid of the sheet.
    ///
    /// The extent runs from A1 to the largest row and column of any cell
    /// element; positions without an element are nil and locked. An extent
    /// of more than `cell_limit` cells is rejected before anything is
    /// allocated for it.
    pub fn read_grid(
        &self,
        name: &str,
        shared_strings: &[String],
        styles: &StyleSheet,
        cell_limit: u64,
    ) -> Result<GridModel> {
        let cells = self.cells(shared_strings)?;
        let rows = cells.iter().map(|c| c.position.row).max().unwrap_or(0);
        let cols = cells.iter().map(|c| c.position.col).max().unwrap_or(0);

        let mut grid = GridModel::with_extent(name, rows, cols, cell_limit)?;
        for cell in cells {
            let CellPosition { row, col } = cell.position;
            grid.set_value(row, col, cell.value)?;
            grid.set_cell_protection(row, col, styles.protection(cell.style))?;
        }
        grid.set_protection(self.sheet_protection());
        Ok(grid)
    }

    /// Current sheet protection
    pub fn sheet_protection(&self) -> SheetProtection {
        match self.tree.first_child_element(self.root, &self.namespace, "sheetProtection") {
            Some(id) => SheetProtection {
                enabled: self
                    .tree
                    .element(id)
                    .and_then(|e| e.attribute("sheet"))
                    .map(parse_bool)
                    .unwrap_or(false),
            },
            None => SheetProtection::default(),
        }
    }

    /// Give every cell of the grid's extent the grid's protection flags.
    ///
    /// Missing rows and cells are created in order; every row and cell of
    /// the extent gets an explicit reference. Values are left alone.
    pub fn write_cell_protection(&mut self, grid: &GridModel, styles: &mut StyleSheet) -> Result<()> {
        let cells = self.ensure_cells(grid)?;
        for (position, cell) in grid.cells() {
            let Some(&node) = cells.get(&position) else {
                continue;
            };
            let base = self
                .tree
                .element(node)
                .and_then(|e| e.attribute("s"))
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            let style = styles.xf_with_protection(base, cell.protection)?;
            if let Some(e) = self.tree.element_mut(node) {
                if style == 0 {
                    e.remove_attribute("s");
                } else {
                    e.set_attribute("s", style.to_string());
                }
            }
        }
        Ok(())
    }

    /// Write every non-nil grid value, strings inline
    pub fn write_values(&mut self, grid: &GridModel) -> Result<()> {
        let cells = self.ensure_cells(grid)?;
        let prefix = self.prefix();
        for (position, cell) in grid.cells() {
            let Some(&node) = cells.get(&position) else {
                continue;
            };
            let old: Vec<NodeId> = self.tree.children(node).to_vec();
            for child in old {
                self.tree.detach(child)?;
            }
            if let Some(e) = self.tree.element_mut(node) {
                e.remove_attribute("t");
            }

            let (cell_type, local, text) = match &cell.value {
                CellValue::Empty => continue,
                CellValue::Text(s) => (Some("inlineStr"), "is", s.clone()),
                CellValue::Number(n) if n.is_finite() => (None, "v", format_number(*n)),
                CellValue::Number(_) => (Some("e"), "v", "#NUM!".to_string()),
                CellValue::Boolean(b) => (Some("b"), "v", if *b { "1" } else { "0" }.to_string()),
                CellValue::Error(e) => (Some("e"), "v", e.clone()),
                CellValue::Formula(f) => (None, "f", f.clone()),
            };
            if let (Some(t), Some(e)) = (cell_type, self.tree.element_mut(node)) {
                e.set_attribute("t", t);
            }

            let holder = self.create(prefix.as_deref(), local);
            let target = if local == "is" {
                let t = self.create(prefix.as_deref(), "t");
                if let Some(e) = self.tree.element_mut(t) {
                    e.set_attribute("xml:space", "preserve");
                }
                self.tree.append_child(holder, t)?;
                t
            } else {
                holder
            };
            if !text.is_empty() {
                let text_node = self.tree.create_text(text);
                self.tree.append_child(target, text_node)?;
            }
            self.tree.append_child(node, holder)?;
        }
        Ok(())
    }

    /// Replace any sheet protection with `protection`.
    ///
    /// The element is placed after `sheetData` (and `sheetCalcPr`), where the
    /// schema expects it.
    pub fn set_sheet_protection(&mut self, protection: &SheetProtection) -> Result<usize> {
        let existing: Vec<NodeId> = self
            .tree
            .child_elements(self.root, &self.namespace, "sheetProtection")
            .collect();
        for &id in &existing {
            self.tree.detach(id)?;
        }
        if !protection.enabled {
            return Ok(existing.len());
        }

        let prefix = self.prefix();
        let element = self.create(prefix.as_deref(), "sheetProtection");
        if let Some(e) = self.tree.element_mut(element) {
            e.set_attribute("sheet", "1");
            e.set_attribute("objects", "1");
            e.set_attribute("scenarios", "1");
        }
        let index = insertion_after(&self.tree, self.root, &BEFORE_SHEET_PROTECTION);
        self.tree.insert_child(self.root, index, element)?;
        Ok(existing.len())
    }

    /// Serialize the worksheet part
    pub fn to_xml(&self) -> Vec<u8> {
        write_xml(&self.tree)
    }

    fn rows(&self) -> Vec<NodeId> {
        self.tree
            .child_elements(self.sheet_data, &self.namespace, "row")
            .collect()
    }

    fn row_cells(&self, row: NodeId) -> Vec<NodeId> {
        self.tree
            .child_elements(row, &self.namespace, "c")
            .collect()
    }

    fn explicit_index(&self, row: NodeId) -> Result<Option<u32>> {
        match self.tree.element(row).and_then(|e| e.attribute("r")) {
            Some(r) => r
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| StoreError::InvalidStructure(format!("bad row number '{}'", r))),
            None => Ok(None),
        }
    }

    fn child_text(&self, node: NodeId, local: &str) -> Option<String> {
        self.tree
            .first_child_element(node, &self.namespace, local)
            .map(|id| self.tree.text_content(id))
    }

    fn decode_value(&self, node: NodeId, position: CellPosition, shared_strings: &[String]) -> Result<CellValue> {
        if let Some(formula) = self.child_text(node, "f") {
            return Ok(CellValue::Formula(formula));
        }
        let cell_type = self
            .tree
            .element(node)
            .and_then(|e| e.attribute("t"))
            .unwrap_or("n");

        if cell_type == "inlineStr" {
            return Ok(match self.tree.first_child_element(node, &self.namespace, "is") {
                Some(is) => CellValue::Text(item_text(&self.tree, is)),
                None => CellValue::Empty,
            });
        }

        let Some(raw) = self.child_text(node, "v") else {
            return Ok(CellValue::Empty);
        };
        let value = match cell_type {
            "s" => {
                let index: usize = raw.trim().parse().map_err(|_| {
                    StoreError::InvalidStructure(format!("bad shared string index at {}", position))
                })?;
                let text = shared_strings.get(index).ok_or_else(|| {
                    StoreError::InvalidStructure(format!(
                        "shared string {} out of range at {}",
                        index, position
                    ))
                })?;
                CellValue::Text(text.clone())
            }
            "b" => CellValue::Boolean(parse_bool(raw.trim())),
            "e" => CellValue::Error(raw),
            "str" | "d" => CellValue::Text(raw),
            _ => match raw.trim().parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::Text(raw),
            },
        };
        Ok(value)
    }

    fn prefix(&self) -> Option<String> {
        self.tree
            .element(self.sheet_data)
            .and_then(|e| e.prefix())
            .map(str::to_string)
    }

    fn create(&mut self, prefix: Option<&str>, local: &str) -> NodeId {
        self.tree
            .create_element(&qualified_name(prefix, local), Some(&self.namespace))
    }

    /// Find or create the cell element of every position in the grid's
    /// extent, setting explicit references along the way
    fn ensure_cells(&mut self, grid: &GridModel) -> Result<BTreeMap<CellPosition, NodeId>> {
        let (rows, cols) = grid.extent();
        let prefix = self.prefix();

        let mut row_nodes: BTreeMap<u32, NodeId> = BTreeMap::new();
        let mut row_num = 0u32;
        for row in self.rows() {
            row_num = self.explicit_index(row)?.unwrap_or(row_num + 1);
            row_nodes.entry(row_num).or_insert(row);
        }

        let mut cells = BTreeMap::new();
        for r in 1..=rows {
            let row = match row_nodes.get(&r) {
                Some(&row) => row,
                None => {
                    let row = self.create(prefix.as_deref(), "row");
                    let index = match row_nodes.range(r + 1..).next() {
                        Some((_, &next)) => self.tree.index_in_parent(next).unwrap_or(0),
                        None => self.tree.children(self.sheet_data).len(),
                    };
                    self.tree.insert_child(self.sheet_data, index, row)?;
                    row_nodes.insert(r, row);
                    row
                }
            };
            if let Some(e) = self.tree.element_mut(row) {
                e.set_attribute("r", r.to_string());
            }

            let mut col_nodes: BTreeMap<u32, NodeId> = BTreeMap::new();
            let mut col = 0u32;
            for node in self.row_cells(row) {
                col = match self.tree.element(node).and_then(|e| e.attribute("r")) {
                    Some(reference) => CellPosition::parse_a1(reference)?.col,
                    None => col + 1,
                };
                col_nodes.entry(col).or_insert(node);
            }

            for c in 1..=cols {
                let position = CellPosition::new(r, c)?;
                let node = match col_nodes.get(&c) {
                    Some(&node) => node,
                    None => {
                        let node = self.create(prefix.as_deref(), "c");
                        let index = match col_nodes.range(c + 1..).next() {
                            Some((_, &next)) => self.tree.index_in_parent(next).unwrap_or(0),
                            None => self
                                .tree
                                .children(row)
                                .iter()
                                .position(|&n| self.tree.is_element(n, &self.namespace, "extLst"))
                                .unwrap_or(self.tree.children(row).len()),
                        };
                        self.tree.insert_child(row, index, node)?;
                        col_nodes.insert(c, node);
                        node
                    }
                };
                if let Some(e) = self.tree.element_mut(node) {
                    e.set_attribute("r", position.to_a1());
                }
                cells.insert(position, node);
            }
        }
        Ok(cells)
    }
}

/// Index just past the last child of `parent` named in `preceding`
fn insertion_after(tree: &XmlTree, parent: NodeId, preceding: &[&str]) -> usize {
    tree.children(parent)
        .iter()
        .rposition(|&c| tree.element(c).is_some_and(|e| preceding.contains(&e.local_name())))
        .map(|i| i + 1)
        .unwrap_or(0)
}

/// Number text without a trailing `.0` for integral values
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
