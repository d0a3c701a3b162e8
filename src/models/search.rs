//! Search request and response models.

use serde::{Deserialize, Serialize};

use super::PaperRecord;

/// Search query parameters sent to the paper index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Main search query string
    pub query: String,

    /// Number of results to skip
    pub offset: usize,

    /// Maximum number of results to return
    pub limit: usize,

    /// Year filter (single year, range like "2018-2022", or "2010-" for from, "-2015" for until)
    pub year: Option<String>,

    /// Venue/journal filter
    pub venue: Option<String>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            offset: 0,
            limit: 10,
            year: None,
            venue: None,
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set the page size
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Set the offset
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Set the year filter
    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    /// Set the venue filter
    pub fn venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    /// Query for the page following this one
    pub fn next_page(&self) -> Self {
        Self {
            offset: self.offset + self.limit,
            ..self.clone()
        }
    }
}

/// A ranked page of results from the index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Papers in index ranking order
    pub papers: Vec<PaperRecord>,

    /// Total number of matches reported by the index
    pub total: usize,

    /// Offset of the first paper in this page
    pub offset: usize,

    /// Offset of the next page, if there is one
    pub next: Option<usize>,
}

impl SearchResponse {
    pub fn new(papers: Vec<PaperRecord>, total: usize, offset: usize, next: Option<usize>) -> Self {
        Self {
            papers,
            total,
            offset,
            next,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }
}
