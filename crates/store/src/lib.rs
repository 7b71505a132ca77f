//! Store - package codec and document adapters
//!
//! This crate turns office files into the models the locker transforms and
//! back:
//!
//! - [`PartMap`]: zip package ⇄ ordered `path -> bytes` map
//! - [`xml`]: XML part ⇄ [`doc_model::XmlTree`]
//! - [`docx::DocxPackage`]: main document and settings parts of a DOCX
//! - [`xlsx::XlsxWorkbook`]: active worksheet of an XLSX ⇄ [`grid_model::GridModel`]
//! - [`xls::XlsSheet`]: value-only reader for legacy XLS workbooks

mod error;
pub mod opc;
pub mod xml;
pub mod docx;
pub mod xlsx;
pub mod xls;

pub use error::*;
pub use opc::PartMap;
