//! [Content_Types].xml parsing and generation

use crate::opc::content_type;
use crate::xml::{escape_attr, XML_DECLARATION};
use crate::Result;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Content types of a package, in source order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentTypes {
    /// Default content types by extension (e.g., "xml" -> "application/xml")
    defaults: Vec<(String, String)>,
    /// Override content types by part name (e.g., "/word/document.xml" -> "...")
    overrides: Vec<(String, String)>,
}

impl ContentTypes {
    /// Content types with the `rels` and `xml` defaults every package needs
    pub fn new() -> Self {
        let mut ct = Self::default();
        ct.add_default("rels", content_type::RELATIONSHIPS);
        ct.add_default("xml", content_type::XML);
        ct
    }

    /// Parse [Content_Types].xml
    pub fn parse(content: &[u8]) -> Result<Self> {
        let mut result = Self::default();
        let mut reader = Reader::from_reader(content);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(ref e) | Event::Start(ref e) => {
                    let key_name: &[u8] = match e.local_name().as_ref() {
                        b"Default" => b"Extension",
                        b"Override" => b"PartName",
                        _ => b"",
                    };
                    let mut key = None;
                    let mut ct = None;
                    for attr in e.attributes() {
                        let attr = attr?;
                        if !key_name.is_empty() && attr.key.as_ref() == key_name {
                            key = Some(attr.unescape_value()?.into_owned());
                        } else if attr.key.as_ref() == b"ContentType" {
                            ct = Some(attr.unescape_value()?.into_owned());
                        }
                    }
                    if let (Some(key), Some(ct)) = (key, ct) {
                        if key_name == b"Extension" {
                            result.defaults.push((key, ct));
                        } else {
                            result.overrides.push((key, ct));
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(result)
    }

    /// Content type for a part path, override first, then by extension
    pub fn content_type_for(&self, path: &str) -> Option<&str> {
        let part_name = normalize_part_name(path);
        if let Some((_, ct)) = self.overrides.iter().find(|(p, _)| p.eq_ignore_ascii_case(&part_name)) {
            return Some(ct);
        }
        let ext = path.rsplit_once('.').map(|(_, ext)| ext)?;
        self.defaults
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(ext))
            .map(|(_, ct)| ct.as_str())
    }

    /// Whether a part has its own override
    pub fn has_override(&self, path: &str) -> bool {
        let part_name = normalize_part_name(path);
        self.overrides.iter().any(|(p, _)| p.eq_ignore_ascii_case(&part_name))
    }

    /// Add or replace the override for a part
    pub fn add_override(&mut self, part_name: &str, content_type: &str) {
        let part_name = normalize_part_name(part_name);
        match self.overrides.iter_mut().find(|(p, _)| p.eq_ignore_ascii_case(&part_name)) {
            Some((_, ct)) => *ct = content_type.to_string(),
            None => self.overrides.push((part_name, content_type.to_string())),
        }
    }

    /// Add a default for an extension unless one exists
    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        if !self.defaults.iter().any(|(e, _)| e.eq_ignore_ascii_case(extension)) {
            self.defaults.push((extension.to_string(), content_type.to_string()));
        }
    }

    /// Generate [Content_Types].xml
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(XML_DECLARATION);
        xml.push('\n');
        xml.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);

        for (ext, ct) in &self.defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_attr(ext),
                escape_attr(ct)
            ));
        }

        for (part, ct) in &self.overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_attr(part),
                escape_attr(ct)
            ));
        }

        xml.push_str("</Types>");
        xml
    }
}

fn normalize_part_name(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}
