//! Text utilities supporting search, display and export.
//!
//! - [`highlight`] / [`Highlighter`]: split text into plain and matching spans
//! - [`format_citations`]: render papers as BibTeX, RIS or APA
//! - [`CitationExport`]: build a named citation file and hand it to a [`FileSink`]
//! - [`HistoryService`]: recent searches stored as JSON lines
//!
//! # Highlighting
//!
//! ```rust
//! use paper_shelf::utils::{Highlighter, SearchTerms};
//!
//! let highlighter = Highlighter::new(&SearchTerms::from_query("neural graph"));
//! let spans = highlighter.highlight("Graph Neural Networks: a review", Some(14));
//! let matched: Vec<&str> = spans.iter().filter(|s| s.is_match()).map(|s| s.text()).collect();
//! assert_eq!(matched, vec!["Graph", "Neural"]);
//! ```
//!
//! # Citations
//!
//! ```rust
//! use paper_shelf::models::PaperBuilder;
//! use paper_shelf::utils::{format_citations, CitationFormat};
//!
//! let papers = vec![PaperBuilder::new("T").authors(["A", "B"]).year(2020).build()];
//! assert_eq!(format_citations(&papers, CitationFormat::Apa), "A, B (2020). T. ");
//! ```

mod cite;
mod export;
mod highlight;
mod history;

pub use cite::{
    format_citation, format_citations, to_apa, to_bibtex, to_ris, CitationFormat, CiteError,
    NO_DATE, UNKNOWN_AUTHOR,
};
pub use export::{export_file_name, CitationExport, DirectorySink, ExportError, FileSink, DEFAULT_EXPORT_NAME};
pub use highlight::{highlight, spans_text, truncate, HighlightSpan, Highlighter, SearchTerms, ELLIPSIS};
pub use history::{HistoryService, SearchEntry};
