//! File-boundary document loading and saving.
//!
//! The only blocking I/O in the crate lives here: whole-file reads and
//! writes at the edge of the core. Formats are detected by extension and
//! output paths derive from the input file name.

use std::path::{Path, PathBuf};

use crate::document::Document;
use crate::error::{Error, Result};

/// Supported document file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Plain text, one sentence per line (`.txt`).
    Text,
    /// Structured JSON document (`.json`).
    Json,
    /// Columnar BIO/CONLL (`.conll`).
    Conll,
}

impl FileKind {
    /// Detect a file kind from a path's extension.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())?
            .to_ascii_lowercase();
        match extension.as_str() {
            "txt" => Some(FileKind::Text),
            "json" => Some(FileKind::Json),
            "conll" => Some(FileKind::Conll),
            _ => None,
        }
    }
}

/// Read a document from a `.txt`, `.json`, or `.conll` file.
///
/// # Errors
///
/// [`Error::FileNotFound`] when the path does not exist,
/// [`Error::UnknownFileFormat`] for unrecognized extensions, and parse
/// errors from the underlying format.
pub fn read_document(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let kind = FileKind::from_path(path)
        .ok_or_else(|| Error::UnknownFileFormat(path.display().to_string()))?;
    let text = std::fs::read_to_string(path)?;
    match kind {
        FileKind::Text => Document::from_text(&text),
        FileKind::Json => Document::from_json_str(&text),
        FileKind::Conll => Document::from_conll(&text),
    }
}

/// Write a document as pretty-printed JSON.
pub fn write_document(document: &Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, document.to_json_string()?)?;
    log::debug!("wrote document to {}", path.display());
    Ok(())
}

/// Export a document as columnar BIO/CONLL text.
///
/// See [`Document::to_conll`] for the column rules.
pub fn export_conll(
    document: &Document,
    path: impl AsRef<Path>,
    num_columns: Option<usize>,
) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, document.to_conll(num_columns))?;
    log::debug!("exported CONLL to {}", path.display());
    Ok(())
}

/// The working JSON path derived from an input file (`notes.txt` →
/// `notes.json`).
#[must_use]
pub fn working_json_path(path: impl AsRef<Path>) -> PathBuf {
    path.as_ref().with_extension("json")
}

/// The CONLL export path derived from a working file (`notes.json` →
/// `notes.bio.conll`).
#[must_use]
pub fn conll_export_path(path: impl AsRef<Path>) -> PathBuf {
    path.as_ref().with_extension("bio.conll")
}

/// The sidecar path for inline slash-tagged text (`notes.txt` →
/// `notes.ann`).
#[must_use]
pub fn annotation_sidecar_path(path: impl AsRef<Path>) -> PathBuf {
    path.as_ref().with_extension("ann")
}

/// Read inline slash-tagged text verbatim from a sidecar file.
///
/// # Errors
///
/// [`Error::FileNotFound`] when the path does not exist.
pub fn read_tagged_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Write inline slash-tagged text verbatim to a sidecar file.
pub fn write_tagged_text(text: &str, path: impl AsRef<Path>) -> Result<()> {
    std::fs::write(path.as_ref(), text)?;
    Ok(())
}
