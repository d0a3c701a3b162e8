//! Paper record carried between the index, the store and the formatters.

use serde::{Deserialize, Serialize};

/// The bibliographic fields needed to search, display or cite a paper.
///
/// Records are built by callers from persisted or freshly fetched data and
/// treated as immutable input by the highlighter and citation formatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRecord {
    /// Paper title
    pub title: String,

    /// Authors in citation order
    #[serde(default)]
    pub authors: Vec<String>,

    /// Abstract text
    #[serde(default, rename = "abstract")]
    pub r#abstract: Option<String>,

    /// Year of publication
    #[serde(default)]
    pub publication_year: Option<i32>,

    /// Journal or venue name
    #[serde(default)]
    pub journal: Option<String>,

    /// Digital Object Identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    /// Paper page URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Identifier assigned by the external index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl PaperRecord {
    /// Create a record with only a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            authors: Vec::new(),
            r#abstract: None,
            publication_year: None,
            journal: None,
            doi: None,
            url: None,
            external_id: None,
        }
    }

    /// Returns true if the record has at least one author
    pub fn has_authors(&self) -> bool {
        !self.authors.is_empty()
    }

    /// Abstract text, or an empty string when absent
    pub fn abstract_text(&self) -> &str {
        self.r#abstract.as_deref().unwrap_or("")
    }
}

/// Builder for constructing PaperRecord objects
#[derive(Debug, Clone)]
pub struct PaperBuilder {
    paper: PaperRecord,
}

impl PaperBuilder {
    /// Create a new builder with the required title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            paper: PaperRecord::new(title),
        }
    }

    /// Append a single author
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.paper.authors.push(author.into());
        self
    }

    /// Replace the author list
    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paper.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Set abstract
    pub fn abstract_text(mut self, abstract_text: impl Into<String>) -> Self {
        self.paper.r#abstract = Some(abstract_text.into());
        self
    }

    /// Set publication year
    pub fn year(mut self, year: i32) -> Self {
        self.paper.publication_year = Some(year);
        self
    }

    /// Set journal
    pub fn journal(mut self, journal: impl Into<String>) -> Self {
        self.paper.journal = Some(journal.into());
        self
    }

    /// Set DOI
    pub fn doi(mut self, doi: impl Into<String>) -> Self {
        self.paper.doi = Some(doi.into());
        self
    }

    /// Set URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.paper.url = Some(url.into());
        self
    }

    /// Set the index identifier
    pub fn external_id(mut self, id: impl Into<String>) -> Self {
        self.paper.external_id = Some(id.into());
        self
    }

    /// Build the PaperRecord
    pub fn build(self) -> PaperRecord {
        self.paper
    }
}
