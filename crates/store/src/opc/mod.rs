//! Open Packaging Conventions
//!
//! An office document is a ZIP archive of parts tied together by
//! relationship parts and described by `[Content_Types].xml`:
//! - `[Content_Types].xml` - content type per extension or part
//! - `_rels/.rels` - package relationships (points at the main part)
//! - `<dir>/_rels/<part>.rels` - relationships of one part

mod content_types;
mod package;
mod relationships;

pub use content_types::ContentTypes;
pub use package::PartMap;
pub use relationships::{rels_path_for, resolve_target, Relationship, Relationships, TargetMode};

/// Path of the content types part
pub const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";
/// Path of the package relationships part
pub const ROOT_RELS_PATH: &str = "_rels/.rels";

/// Relationship type URIs
pub mod relationship_types {
    pub const OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    pub const SETTINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
    pub const WORKSHEET: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
    pub const STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
    pub const SHARED_STRINGS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";
}

/// Content types of the parts the locker reads or writes
pub mod content_type {
    pub const RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
    pub const XML: &str = "application/xml";
    pub const WORD_SETTINGS: &str =
        "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";
    pub const SPREADSHEET_MAIN: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
    pub const WORKSHEET: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
    pub const SPREADSHEET_STYLES: &str =
        "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
}
