//! Document Loading
//!
//! Extracts raw text from uploaded manuals. Dispatches on file extension to
//! one of three extraction strategies (PDF, DOCX, plain-text fallback) and
//! returns text segments carrying the source file's basename. No chunking
//! happens here.

use std::fs;
use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unreadable document {path}: {reason}")]
    UnreadableDocument { path: String, reason: String },
}

impl LoaderError {
    fn unreadable(path: &Path, reason: impl Into<String>) -> Self {
        LoaderError::UnreadableDocument {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }
}

/// Extraction strategy, chosen purely from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    /// Anything else is treated as UTF-8 plain text.
    PlainText,
}

impl DocumentFormat {
    pub fn for_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => DocumentFormat::Pdf,
            "docx" => DocumentFormat::Docx,
            _ => DocumentFormat::PlainText,
        }
    }
}

/// A raw text segment with source provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSegment {
    pub text: String,
    /// Basename of the originating file.
    pub source_file: String,
}

/// Load a document and extract its raw text segments.
///
/// An empty or whitespace-only document yields zero segments, not an error.
pub fn load_document(path: &Path) -> Result<Vec<RawSegment>, LoaderError> {
    let format = DocumentFormat::for_path(path);
    let source_file = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    debug!(path = ?path, format = ?format, "Loading document");

    let text = match format {
        DocumentFormat::Pdf => extract_pdf(path)?,
        DocumentFormat::Docx => extract_docx(path)?,
        DocumentFormat::PlainText => extract_plain_text(path)?,
    };

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    Ok(vec![RawSegment { text, source_file }])
}

fn extract_pdf(path: &Path) -> Result<String, LoaderError> {
    pdf_extract::extract_text(path).map_err(|e| LoaderError::unreadable(path, e.to_string()))
}

/// A .docx file is a ZIP archive; the document body lives in
/// `word/document.xml`. Text runs are collected and paragraph ends become
/// newlines.
fn extract_docx(path: &Path) -> Result<String, LoaderError> {
    let file = fs::File::open(path)?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| LoaderError::unreadable(path, e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| LoaderError::unreadable(path, e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| LoaderError::unreadable(path, e.to_string()))?;

    let mut reader = Reader::from_str(&xml);
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(t)) => {
                let unescaped = t
                    .unescape()
                    .map_err(|e| LoaderError::unreadable(path, e.to_string()))?;
                text.push_str(&unescaped);
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => text.push('\n'),
            Ok(Event::Eof) => break,
            Err(e) => return Err(LoaderError::unreadable(path, e.to_string())),
            _ => {}
        }
    }

    Ok(text)
}

fn extract_plain_text(path: &Path) -> Result<String, LoaderError> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            Err(LoaderError::unreadable(path, "not valid UTF-8"))
        }
        Err(e) => Err(LoaderError::Io(e)),
    }
}
