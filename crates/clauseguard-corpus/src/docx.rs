//! `.docx` package access.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use zip::ZipArchive;

use crate::error::CorpusError;
use crate::markup::RevisionMarkup;

/// Main document part inside a WordprocessingML package.
pub const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    Docx,
    /// Legacy binary format; needs conversion first.
    Doc,
}

impl DocFormat {
    /// Classify a file by extension, case-insensitively. Office lock files
    /// (`~$name.docx`) are never candidates.
    pub fn of(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.starts_with("~$") {
            return None;
        }
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "docx" => Some(Self::Docx),
            "doc" => Some(Self::Doc),
            _ => None,
        }
    }
}

pub fn read_document_xml(path: &Path) -> Result<String, CorpusError> {
    let file = File::open(path).map_err(|e| CorpusError::unreadable(path, e))?;
    let mut archive =
        ZipArchive::new(BufReader::new(file)).map_err(|e| CorpusError::unreadable(path, e))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| CorpusError::unreadable(path, e))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| CorpusError::unreadable(path, e))?;
    Ok(xml)
}

pub fn read_revisions(path: &Path) -> Result<RevisionMarkup, CorpusError> {
    let xml = read_document_xml(path)?;
    RevisionMarkup::parse(&xml).map_err(|e| CorpusError::unreadable(path, e))
}

/// Paragraph texts of a document with every tracked change accepted.
pub fn read_paragraphs(path: &Path) -> Result<Vec<String>, CorpusError> {
    Ok(read_revisions(path)?.paragraph_texts())
}
