//! Citation export: turning a list of papers into a downloadable file.
//!
//! Building an export is pure; writing it is delegated to a [`FileSink`].
//!
//! ```rust,no_run
//! use paper_shelf::utils::{CitationExport, CitationFormat, DirectorySink};
//! # use paper_shelf::models::PaperRecord;
//! # fn example(papers: Vec<PaperRecord>) -> Result<(), Box<dyn std::error::Error>> {
//! if let Some(export) = CitationExport::build(&papers, CitationFormat::Ris, Some("Reading group")) {
//!     let path = export.save(&DirectorySink::new("./exports"))?;
//!     println!("wrote {}", path.display());
//! }
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::cite::{format_citations, CitationFormat};
use crate::models::PaperRecord;

/// File name stem used when the list has no usable name
pub const DEFAULT_EXPORT_NAME: &str = "papers";

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid export file name: {0}")]
    InvalidFileName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A rendered citation file ready to be saved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationExport {
    pub file_name: String,
    pub mime_type: &'static str,
    pub format: CitationFormat,
    pub contents: String,
}

impl CitationExport {
    /// Render `papers` for export.
    ///
    /// Returns `None` for an empty list: there is nothing to export and no
    /// empty file should be produced.
    pub fn build(papers: &[PaperRecord], format: CitationFormat, list_name: Option<&str>) -> Option<Self> {
        if papers.is_empty() {
            return None;
        }

        Some(Self {
            file_name: export_file_name(list_name, format),
            mime_type: format.mime_type(),
            format,
            contents: format_citations(papers, format),
        })
    }

    /// Hand the rendered file to a sink
    pub fn save(&self, sink: &dyn FileSink) -> Result<PathBuf, ExportError> {
        sink.save(&self.file_name, self.mime_type, &self.contents)
    }
}

/// `<list name>-citations.<ext>`, falling back to [`DEFAULT_EXPORT_NAME`]
///
/// The list name is sanitized so any list can be written to disk.
pub fn export_file_name(list_name: Option<&str>, format: CitationFormat) -> String {
    let stem = list_name
        .map(sanitize_stem)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_EXPORT_NAME.to_string());
    format!("{}-citations.{}", stem, format.extension())
}

/// Keep alphanumerics, dash, underscore, dot and space; everything else
/// becomes `_`. Runs of dots collapse so `..` never survives.
fn sanitize_stem(name: &str) -> String {
    let mut stem = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch == '.' && stem.ends_with('.') {
            stem.pop();
            stem.push('_');
        } else if ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.' | ' ') {
            stem.push(ch);
        } else {
            stem.push('_');
        }
    }
    stem.trim_matches(|c| c == '.' || c == ' ').to_string()
}

/// Destination for exported files
pub trait FileSink {
    /// Save `contents` under `file_name`, returning where it was written
    fn save(&self, file_name: &str, mime_type: &str, contents: &str) -> Result<PathBuf, ExportError>;
}

/// Writes exports into a directory, creating it on demand
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSink for DirectorySink {
    fn save(&self, file_name: &str, mime_type: &str, contents: &str) -> Result<PathBuf, ExportError> {
        // List names are user input and end up in the file name.
        if file_name.is_empty()
            || file_name.contains(['/', '\\', '\0'])
            || file_name.contains("..")
        {
            return Err(ExportError::InvalidFileName(file_name.to_string()));
        }

        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, contents)?;

        tracing::debug!("Saved {} ({} bytes) to {}", mime_type, contents.len(), path.display());
        Ok(path)
    }
}
