//! Error types for storage operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP archive error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Package or part that does not have the expected structure
    #[error("Invalid package structure: {0}")]
    InvalidStructure(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// Legacy workbook decoding error
    #[error("XLS error: {0}")]
    Xls(String),

    #[error("Document model error: {0}")]
    DocModel(#[from] doc_model::DocModelError),

    #[error("Grid model error: {0}")]
    Grid(#[from] grid_model::GridError),
}

impl From<quick_xml::Error> for StoreError {
    fn from(err: quick_xml::Error) -> Self {
        StoreError::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for StoreError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        StoreError::XmlParse(format!("Attribute error: {}", err))
    }
}

impl From<quick_xml::escape::EscapeError> for StoreError {
    fn from(err: quick_xml::escape::EscapeError) -> Self {
        StoreError::XmlParse(format!("Escape error: {}", err))
    }
}

impl From<calamine::XlsError> for StoreError {
    fn from(err: calamine::XlsError) -> Self {
        StoreError::Xls(err.to_string())
    }
}

impl StoreError {
    /// Whether the error comes from unreadable content rather than the
    /// container or the environment
    pub fn is_malformed_content(&self) -> bool {
        matches!(
            self,
            StoreError::XmlParse(_)
                | StoreError::InvalidStructure(_)
                | StoreError::MissingPart(_)
                | StoreError::DocModel(_)
                | StoreError::Grid(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
