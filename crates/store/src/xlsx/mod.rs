//! XLSX workbook access
//!
//! The locker transforms the workbook's active sheet. Reading produces a
//! [`GridModel`] whose cells carry the protection flags of their formats;
//! writing applies the grid's flags and sheet protection back onto the
//! same sheet, leaving every other part as it was.
//!
//! ## Structure
//!
//! - `xl/workbook.xml` - sheet list and active tab
//! - `xl/_rels/workbook.xml.rels` - sheet, styles and shared strings parts
//! - `xl/worksheets/sheetN.xml` - cell data and sheet protection
//! - `xl/styles.xml` - cell formats (`cellXfs`), including protection
//! - `xl/sharedStrings.xml` - string table

mod shared_strings;
mod sheet;
mod styles;
mod workbook;

pub use shared_strings::parse_shared_strings;
pub use sheet::{SheetCell, Worksheet};
pub use styles::{StyleSheet, MINIMAL_STYLES};
pub use workbook::{SheetEntry, WorkbookInfo};

use crate::opc::{
    content_type, rels_path_for, relationship_types, resolve_target, ContentTypes, PartMap,
    Relationships, TargetMode, CONTENT_TYPES_PATH, ROOT_RELS_PATH,
};
use crate::xml::escape_attr;
use crate::{Result, StoreError};
use grid_model::GridModel;

/// SpreadsheetML main namespace
pub const SML_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Conventional location of the workbook part
pub const DEFAULT_WORKBOOK_PART: &str = "xl/workbook.xml";

/// An opened workbook, positioned on its active sheet
#[derive(Debug)]
pub struct XlsxWorkbook {
    parts: PartMap,
    workbook_path: String,
    sheet_name: String,
    sheet_path: String,
    sheet: Worksheet,
    styles_path: String,
    styles: StyleSheet,
    styles_synthesized: bool,
    shared_strings: Vec<String>,
}

impl XlsxWorkbook {
    /// Decode an XLSX file
    pub fn open(bytes: &[u8]) -> Result<Self> {
        Self::from_parts(PartMap::extract(bytes)?)
    }

    /// Locate and parse the active sheet and its supporting parts
    pub fn from_parts(parts: PartMap) -> Result<Self> {
        let workbook_path = resolve_workbook_part(&parts)?;
        let workbook_bytes = parts
            .get(&workbook_path)
            .ok_or_else(|| StoreError::MissingPart(workbook_path.clone()))?;
        let info = WorkbookInfo::parse(workbook_bytes)?;

        let rels_path = rels_path_for(&workbook_path);
        let rels = match parts.get(&rels_path) {
            Some(bytes) => Relationships::parse(bytes)?,
            None => return Err(StoreError::MissingPart(rels_path)),
        };

        let (sheet_name, sheet_path) = active_sheet(&info, &rels, &workbook_path)?;
        let sheet_bytes = parts
            .get(&sheet_path)
            .ok_or_else(|| StoreError::MissingPart(sheet_path.clone()))?;
        let sheet = Worksheet::parse(sheet_bytes)?;

        let shared_strings = match rels.get_by_type(relationship_types::SHARED_STRINGS) {
            Some(rel) => {
                let path = resolve_target(&workbook_path, &rel.target);
                match parts.get(&path) {
                    Some(bytes) => parse_shared_strings(bytes)?,
                    None => return Err(StoreError::MissingPart(path)),
                }
            }
            None => Vec::new(),
        };

        let styles_rel = rels.get_by_type(relationship_types::STYLES);
        let styles_path = match styles_rel {
            Some(rel) => resolve_target(&workbook_path, &rel.target),
            None => resolve_target(&workbook_path, "styles.xml"),
        };
        let (styles, styles_synthesized) = match parts.get(&styles_path) {
            Some(bytes) => (StyleSheet::parse(bytes)?, false),
            None => {
                tracing::info!("No styles part at {}, synthesizing one", styles_path);
                (StyleSheet::minimal()?, true)
            }
        };

        tracing::debug!("Active sheet '{}' at {}", sheet_name, sheet_path);
        Ok(Self {
            parts,
            workbook_path,
            sheet_name,
            sheet_path,
            sheet,
            styles_path,
            styles,
            styles_synthesized,
            shared_strings,
        })
    }

    /// A new single-sheet workbook with no cells
    pub fn blank(sheet_name: &str) -> Result<Self> {
        let mut parts = PartMap::new();
        parts.insert(CONTENT_TYPES_PATH, blank_content_types().to_xml().into_bytes());
        parts.insert(ROOT_RELS_PATH, blank_root_rels().to_xml().into_bytes());
        parts.insert(DEFAULT_WORKBOOK_PART, blank_workbook_xml(sheet_name).into_bytes());
        parts.insert("xl/_rels/workbook.xml.rels", blank_workbook_rels().to_xml().into_bytes());
        parts.insert("xl/styles.xml", MINIMAL_STYLES.as_bytes().to_vec());
        parts.insert("xl/worksheets/sheet1.xml", Worksheet::blank()?.to_xml());
        Self::from_parts(parts)
    }

    /// Name of the active sheet
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    pub fn sheet_part_path(&self) -> &str {
        &self.sheet_path
    }

    pub fn workbook_part_path(&self) -> &str {
        &self.workbook_path
    }

    /// Read the active sheet as a grid of at most `cell_limit` cells
    pub fn read_grid(&self, cell_limit: u64) -> Result<GridModel> {
        self.sheet
            .read_grid(&self.sheet_name, &self.shared_strings, &self.styles, cell_limit)
    }

    /// Apply the grid's cell protection and sheet protection to the sheet
    pub fn write_grid(&mut self, grid: &GridModel) -> Result<()> {
        self.sheet.write_cell_protection(grid, &mut self.styles)?;
        self.sheet.set_sheet_protection(grid.protection())?;
        Ok(())
    }

    /// Write the grid's values into the sheet, then its protection
    pub fn write_grid_with_values(&mut self, grid: &GridModel) -> Result<()> {
        self.sheet.write_values(grid)?;
        self.write_grid(grid)
    }

    /// Write the sheet and styles back into the part map
    pub fn into_parts(mut self) -> Result<PartMap> {
        self.parts.insert(self.sheet_path.clone(), self.sheet.to_xml());
        self.parts.insert(self.styles_path.clone(), self.styles.to_xml());
        if self.styles_synthesized {
            self.register_styles_part()?;
        }
        Ok(self.parts)
    }

    /// Encode the workbook as an XLSX file
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        self.into_parts()?.pack()
    }

    fn register_styles_part(&mut self) -> Result<()> {
        let mut types = match self.parts.get(CONTENT_TYPES_PATH) {
            Some(bytes) => ContentTypes::parse(bytes)?,
            None => ContentTypes::new(),
        };
        if !types.has_override(&self.styles_path) {
            types.add_override(&self.styles_path, content_type::SPREADSHEET_STYLES);
            self.parts.insert(CONTENT_TYPES_PATH, types.to_xml().into_bytes());
        }

        let rels_path = rels_path_for(&self.workbook_path);
        let mut rels = match self.parts.get(&rels_path) {
            Some(bytes) => Relationships::parse(bytes)?,
            None => Relationships::new(),
        };
        if rels.get_by_type(relationship_types::STYLES).is_none() {
            rels.add(relationship_types::STYLES, "styles.xml", TargetMode::Internal);
            self.parts.insert(rels_path, rels.to_xml().into_bytes());
        }
        Ok(())
    }
}

/// Encode a grid that has no source package as a fresh workbook
pub fn write_new_workbook(grid: &GridModel) -> Result<Vec<u8>> {
    let name = if grid.name().trim().is_empty() {
        "Sheet1"
    } else {
        grid.name()
    };
    let mut workbook = XlsxWorkbook::blank(name)?;
    workbook.write_grid_with_values(grid)?;
    workbook.into_bytes()
}

fn resolve_workbook_part(parts: &PartMap) -> Result<String> {
    if let Some(bytes) = parts.get(ROOT_RELS_PATH) {
        let rels = Relationships::parse(bytes)?;
        if let Some(rel) = rels.get_by_type(relationship_types::OFFICE_DOCUMENT) {
            return Ok(resolve_target("", &rel.target));
        }
    }
    tracing::warn!("No officeDocument relationship, falling back to {}", DEFAULT_WORKBOOK_PART);
    Ok(DEFAULT_WORKBOOK_PART.to_string())
}

/// Name and part path of the active worksheet.
///
/// When the active tab is not a worksheet (a chart sheet, or an index past
/// the end) the first worksheet is used instead.
fn active_sheet(info: &WorkbookInfo, rels: &Relationships, workbook_path: &str) -> Result<(String, String)> {
    let worksheet = |entry: &SheetEntry| {
        rels.get(&entry.rel_id)
            .filter(|rel| rel.rel_type == relationship_types::WORKSHEET)
            .map(|rel| (entry.name.clone(), resolve_target(workbook_path, &rel.target)))
    };

    if let Some(found) = info.sheets.get(info.active_tab).and_then(worksheet) {
        return Ok(found);
    }
    tracing::warn!("Active tab {} is not a worksheet, using the first worksheet", info.active_tab);
    info.sheets
        .iter()
        .find_map(worksheet)
        .ok_or_else(|| StoreError::InvalidStructure("workbook has no worksheets".to_string()))
}

fn blank_content_types() -> ContentTypes {
    let mut types = ContentTypes::new();
    types.add_override(DEFAULT_WORKBOOK_PART, content_type::SPREADSHEET_MAIN);
    types.add_override("xl/worksheets/sheet1.xml", content_type::WORKSHEET);
    types.add_override("xl/styles.xml", content_type::SPREADSHEET_STYLES);
    types
}

fn blank_root_rels() -> Relationships {
    let mut rels = Relationships::new();
    rels.add(relationship_types::OFFICE_DOCUMENT, DEFAULT_WORKBOOK_PART, TargetMode::Internal);
    rels
}

fn blank_workbook_rels() -> Relationships {
    let mut rels = Relationships::new();
    rels.add(relationship_types::WORKSHEET, "worksheets/sheet1.xml", TargetMode::Internal);
    rels.add(relationship_types::STYLES, "styles.xml", TargetMode::Internal);
    rels
}

fn blank_workbook_xml(sheet_name: &str) -> String {
    format!(
        r#"{}
<workbook xmlns="{}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><bookViews><workbookView activeTab="0"/></bookViews><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        crate::xml::XML_DECLARATION,
        SML_NS,
        escape_attr(sheet_name)
    )
}
