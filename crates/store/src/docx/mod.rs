//! DOCX package access
//!
//! The locker works on two parts of a word-processing package: the main
//! document part and its settings part. Both are found through
//! relationships; every other part passes through untouched.

use crate::opc::{
    content_type, rels_path_for, relationship_types, resolve_target, ContentTypes, PartMap,
    Relationships, TargetMode, CONTENT_TYPES_PATH, ROOT_RELS_PATH,
};
use crate::xml::{parse_xml, write_xml};
use crate::{Result, StoreError};
use doc_model::{wordml, XmlTree};

/// Conventional location of the main document part
pub const DEFAULT_MAIN_PART: &str = "word/document.xml";
/// Conventional file name of the settings part, next to the main part
pub const DEFAULT_SETTINGS_NAME: &str = "settings.xml";

/// An opened word-processing package
#[derive(Debug)]
pub struct DocxPackage {
    parts: PartMap,
    main_path: String,
    settings_path: String,
    document: XmlTree,
    settings: XmlTree,
    settings_synthesized: bool,
}

impl DocxPackage {
    /// Decode a DOCX file
    pub fn open(bytes: &[u8]) -> Result<Self> {
        Self::from_parts(PartMap::extract(bytes)?)
    }

    /// Resolve and parse the main and settings parts of an extracted package
    pub fn from_parts(parts: PartMap) -> Result<Self> {
        let main_path = resolve_main_part(&parts)?;
        let document_bytes = parts
            .get(&main_path)
            .ok_or_else(|| StoreError::MissingPart(main_path.clone()))?;
        let document = parse_xml(document_bytes)?;

        let settings_path = resolve_settings_part(&parts, &main_path)?;
        let (settings, settings_synthesized) = match parts.get(&settings_path) {
            Some(bytes) => (parse_xml(bytes)?, false),
            None => {
                tracing::info!("No settings part at {}, synthesizing one", settings_path);
                (wordml::empty_settings(), true)
            }
        };

        Ok(Self {
            parts,
            main_path,
            settings_path,
            document,
            settings,
            settings_synthesized,
        })
    }

    pub fn main_part_path(&self) -> &str {
        &self.main_path
    }

    pub fn settings_part_path(&self) -> &str {
        &self.settings_path
    }

    /// Whether the settings part was created because the package had none
    pub fn settings_synthesized(&self) -> bool {
        self.settings_synthesized
    }

    pub fn document(&self) -> &XmlTree {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut XmlTree {
        &mut self.document
    }

    pub fn settings(&self) -> &XmlTree {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut XmlTree {
        &mut self.settings
    }

    /// The main document and settings trees, for changing both together
    pub fn trees_mut(&mut self) -> (&mut XmlTree, &mut XmlTree) {
        (&mut self.document, &mut self.settings)
    }

    /// Write both trees back into the part map.
    ///
    /// A synthesized settings part is also registered in the content types
    /// and in the main part's relationships when either is missing.
    pub fn into_parts(mut self) -> Result<PartMap> {
        self.parts.insert(self.main_path.clone(), write_xml(&self.document));
        self.parts.insert(self.settings_path.clone(), write_xml(&self.settings));

        if self.settings_synthesized {
            self.register_settings_part()?;
        }
        Ok(self.parts)
    }

    /// Encode the package as a DOCX file
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        self.into_parts()?.pack()
    }

    fn register_settings_part(&mut self) -> Result<()> {
        let mut types = match self.parts.get(CONTENT_TYPES_PATH) {
            Some(bytes) => ContentTypes::parse(bytes)?,
            None => ContentTypes::new(),
        };
        if !types.has_override(&self.settings_path) {
            types.add_override(&self.settings_path, content_type::WORD_SETTINGS);
            self.parts.insert(CONTENT_TYPES_PATH, types.to_xml().into_bytes());
        }

        let rels_path = rels_path_for(&self.main_path);
        let mut rels = match self.parts.get(&rels_path) {
            Some(bytes) => Relationships::parse(bytes)?,
            None => Relationships::new(),
        };
        if rels.get_by_type(relationship_types::SETTINGS).is_none() {
            let target = relative_target(&self.main_path, &self.settings_path);
            let id = rels.add(relationship_types::SETTINGS, &target, TargetMode::Internal);
            tracing::debug!("Added settings relationship {} -> {}", id, target);
            self.parts.insert(rels_path, rels.to_xml().into_bytes());
        }
        Ok(())
    }
}

fn resolve_main_part(parts: &PartMap) -> Result<String> {
    if let Some(bytes) = parts.get(ROOT_RELS_PATH) {
        let rels = Relationships::parse(bytes)?;
        if let Some(rel) = rels.get_by_type(relationship_types::OFFICE_DOCUMENT) {
            return Ok(resolve_target("", &rel.target));
        }
    }
    tracing::warn!("No officeDocument relationship, falling back to {}", DEFAULT_MAIN_PART);
    Ok(DEFAULT_MAIN_PART.to_string())
}

fn resolve_settings_part(parts: &PartMap, main_path: &str) -> Result<String> {
    if let Some(bytes) = parts.get(&rels_path_for(main_path)) {
        let rels = Relationships::parse(bytes)?;
        if let Some(rel) = rels.get_by_type(relationship_types::SETTINGS) {
            return Ok(resolve_target(main_path, &rel.target));
        }
    }
    tracing::debug!("No settings relationship for {}, using the conventional location", main_path);
    Ok(resolve_target(main_path, DEFAULT_SETTINGS_NAME))
}

/// Relationship target for `part` as seen from `source`
fn relative_target(source: &str, part: &str) -> String {
    let dir = source.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    match part.strip_prefix(dir).and_then(|rest| rest.strip_prefix('/')) {
        Some(rest) if !dir.is_empty() => rest.to_string(),
        _ if dir.is_empty() => part.to_string(),
        _ => format!("/{}", part),
    }
}
