//! ZIP package ⇄ ordered part map

use crate::Result;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// The parts of a package keyed by path, in archive order.
///
/// Order is kept so a repacked document lists its parts the way the input
/// did; `[Content_Types].xml` in particular stays first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartMap {
    parts: Vec<(String, Vec<u8>)>,
}

impl PartMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every file entry of a ZIP package
    pub fn extract(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let mut file = archive.by_index(index)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut contents = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut contents)?;
            parts.push((name, contents));
        }

        tracing::debug!("Extracted {} parts from package", parts.len());
        Ok(Self { parts })
    }

    /// Write all parts into a deflate-compressed ZIP package
    pub fn pack(&self) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);

        for (path, contents) in &self.parts {
            zip.start_file(path.as_str(), options)?;
            zip.write_all(contents)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    /// Get a part's bytes
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, bytes)| bytes.as_slice())
    }

    /// Replace a part in place, or append it when new
    pub fn insert(&mut self, path: impl Into<String>, contents: Vec<u8>) {
        let path = path.into();
        match self.parts.iter_mut().find(|(p, _)| *p == path) {
            Some((_, existing)) => *existing = contents,
            None => self.parts.push((path, contents)),
        }
    }

    /// Remove a part, returning its bytes
    pub fn remove(&mut self, path: &str) -> Option<Vec<u8>> {
        let index = self.parts.iter().position(|(p, _)| p == path)?;
        Some(self.parts.remove(index).1)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.parts.iter().any(|(p, _)| p == path)
    }

    /// Part paths in package order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(p, _)| p.as_str())
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
