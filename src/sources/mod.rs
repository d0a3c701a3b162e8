//! External academic index clients.
//!
//! Ranking is delegated entirely to the index: a [`PaperIndex`] takes a
//! query with pagination and simple filters and returns papers in the order
//! the index ranked them.
//!
//! # Feature Flags
//!
//! - `semantic` - Enable the Semantic Scholar index (default: enabled)

#[cfg(feature = "source-semantic")]
mod semantic;

#[cfg(feature = "source-semantic")]
pub use semantic::SemanticScholarIndex;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{SearchQuery, SearchResponse};

/// A searchable paper index
#[async_trait]
pub trait PaperIndex: Send + Sync {
    /// Short identifier, e.g. `semantic`
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// Search for papers matching the query
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError>;
}

/// Errors returned by index clients
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimit,

    /// API error from the index
    #[error("API error: {0}")]
    Api(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}
