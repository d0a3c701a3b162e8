//! Citation formatting for exported paper lists.
//!
//! Supports BibTeX, RIS and APA. Missing fields degrade to fixed fallbacks
//! (`Unknown` authors, `n.d.` year, empty journal) rather than failing.

use crate::models::PaperRecord;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Placeholder used when a paper has no authors
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Placeholder used by APA when a paper has no year
pub const NO_DATE: &str = "n.d.";

/// Citation format
///
/// Parsed case-insensitively everywhere: CLI flags, config values and
/// [`FromStr`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CitationFormat {
    /// BibTeX `@article` entries
    #[default]
    #[value(alias = "bib")]
    Bibtex,
    /// RIS tagged records
    Ris,
    /// APA-style reference paragraphs
    Apa,
}

impl CitationFormat {
    pub const ALL: [CitationFormat; 3] = [CitationFormat::Bibtex, CitationFormat::Ris, CitationFormat::Apa];

    /// File extension for exported citations
    pub fn extension(&self) -> &'static str {
        match self {
            CitationFormat::Bibtex => "bib",
            CitationFormat::Ris => "ris",
            CitationFormat::Apa => "txt",
        }
    }

    /// MIME type of exported citations
    pub fn mime_type(&self) -> &'static str {
        "text/plain"
    }

    /// Identifier accepted by [`FromStr`]
    pub fn id(&self) -> &'static str {
        match self {
            CitationFormat::Bibtex => "bibtex",
            CitationFormat::Ris => "ris",
            CitationFormat::Apa => "apa",
        }
    }
}

impl fmt::Display for CitationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CitationFormat::Bibtex => write!(f, "BibTeX"),
            CitationFormat::Ris => write!(f, "RIS"),
            CitationFormat::Apa => write!(f, "APA"),
        }
    }
}

/// Citation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CiteError {
    #[error("Unknown citation format: {0} (expected bibtex, ris or apa)")]
    UnknownFormat(String),
}

impl FromStr for CitationFormat {
    type Err = CiteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bibtex" | "bib" => Ok(CitationFormat::Bibtex),
            "ris" => Ok(CitationFormat::Ris),
            "apa" => Ok(CitationFormat::Apa),
            _ => Err(CiteError::UnknownFormat(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for CitationFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// Generate a BibTeX entry keyed `paper<index>`
///
/// Format: @article{paper1,
///   title = {Title},
///   author = {A and B},
///   year = {Year},
///   journal = {Journal},
/// }
pub fn to_bibtex(paper: &PaperRecord, index: usize) -> String {
    let authors = if paper.authors.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        paper.authors.join(" and ")
    };

    let mut entry = format!(
        "@article{{paper{},\n  title = {{{}}},\n  author = {{{}}},\n",
        index, paper.title, authors
    );
    if let Some(year) = paper.publication_year {
        entry.push_str(&format!("  year = {{{}}},\n", year));
    }
    if let Some(journal) = &paper.journal {
        entry.push_str(&format!("  journal = {{{}}},\n", journal));
    }
    entry.push_str("}\n");
    entry
}

/// Generate a RIS record
pub fn to_ris(paper: &PaperRecord) -> String {
    let mut lines = vec!["TY  - JOUR".to_string(), format!("TI  - {}", paper.title)];

    if paper.authors.is_empty() {
        lines.push(format!("AU  - {}", UNKNOWN_AUTHOR));
    } else {
        lines.extend(paper.authors.iter().map(|a| format!("AU  - {}", a)));
    }
    if let Some(journal) = &paper.journal {
        lines.push(format!("JO  - {}", journal));
    }
    if let Some(year) = paper.publication_year {
        lines.push(format!("PY  - {}", year));
    }
    lines.push("ER  -".to_string());

    lines.join("\n")
}

/// Format paper as an APA-style reference
/// Format: A, B (Year). Title. Journal
pub fn to_apa(paper: &PaperRecord) -> String {
    let authors = if paper.authors.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        paper.authors.join(", ")
    };
    let year = paper
        .publication_year
        .map(|y| y.to_string())
        .unwrap_or_else(|| NO_DATE.to_string());
    let journal = paper.journal.as_deref().unwrap_or("");

    format!("{} ({}). {}. {}", authors, year, paper.title, journal)
}

/// Render papers in order into a single citation document
pub fn format_citations(papers: &[PaperRecord], format: CitationFormat) -> String {
    match format {
        // Each entry already ends in a newline; one more gives the blank separator.
        CitationFormat::Bibtex => papers
            .iter()
            .enumerate()
            .map(|(i, p)| to_bibtex(p, i + 1))
            .collect::<Vec<_>>()
            .join("\n"),
        CitationFormat::Ris => papers.iter().map(to_ris).collect::<Vec<_>>().join("\n\n"),
        CitationFormat::Apa => papers.iter().map(to_apa).collect::<Vec<_>>().join("\n\n"),
    }
}

/// Format a single paper in the given format
pub fn format_citation(paper: &PaperRecord, format: CitationFormat) -> String {
    format_citations(std::slice::from_ref(paper), format)
}
