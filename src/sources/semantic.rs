//! Semantic Scholar index implementation.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::models::{PaperBuilder, PaperRecord, SearchQuery, SearchResponse};
use crate::sources::{PaperIndex, SourceError};

pub const SEMANTIC_API_BASE: &str = "https://api.semanticscholar.org/graph/v1";

const SEARCH_FIELDS: &str = "title,authors,year,venue,abstract,externalIds,url";

/// Semantic Scholar's search endpoint caps a page at 100 results.
const MAX_LIMIT: usize = 100;

/// Semantic Scholar paper index
#[derive(Debug, Clone)]
pub struct SemanticScholarIndex {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
}

impl SemanticScholarIndex {
    /// Create a client against the public API
    pub fn new(api_key: Option<String>) -> Result<Self, SourceError> {
        Self::with_base_url(SEMANTIC_API_BASE, api_key)
    }

    /// Create a client against a custom base URL (proxies, tests)
    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn build_url(&self, query: &SearchQuery) -> String {
        let mut url = format!(
            "{}/paper/search?query={}&offset={}&limit={}&fields={}",
            self.base_url,
            urlencoding::encode(query.query.trim()),
            query.offset,
            query.limit.clamp(1, MAX_LIMIT),
            SEARCH_FIELDS
        );
        if let Some(year) = query.year.as_deref().map(str::trim).filter(|y| !y.is_empty()) {
            url.push_str(&format!("&year={}", urlencoding::encode(year)));
        }
        if let Some(venue) = query.venue.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            url.push_str(&format!("&venue={}", urlencoding::encode(venue)));
        }
        url
    }

    fn add_api_key_if_present(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref key) = self.api_key {
            builder.header("x-api-key", key)
        } else {
            builder
        }
    }

    fn parse_paper(data: S2Paper) -> PaperRecord {
        let mut builder = PaperBuilder::new(data.title.unwrap_or_default())
            .authors(data.authors.into_iter().filter_map(|a| a.name));

        if let Some(year) = data.year {
            builder = builder.year(year);
        }
        if let Some(venue) = data.venue.filter(|v| !v.trim().is_empty()) {
            builder = builder.journal(venue);
        }
        if let Some(text) = data.r#abstract.filter(|a| !a.trim().is_empty()) {
            builder = builder.abstract_text(text);
        }
        if let Some(doi) = data.external_ids.and_then(|ids| ids.doi) {
            builder = builder.doi(doi);
        }
        if let Some(url) = data.url {
            builder = builder.url(url);
        }
        if let Some(id) = data.paper_id {
            builder = builder.external_id(id);
        }

        builder.build()
    }
}

#[async_trait]
impl PaperIndex for SemanticScholarIndex {
    fn id(&self) -> &str {
        "semantic"
    }

    fn name(&self) -> &str {
        "Semantic Scholar"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, SourceError> {
        if query.query.trim().is_empty() {
            return Err(SourceError::InvalidRequest("query must not be empty".to_string()));
        }

        let url = self.build_url(query);
        tracing::debug!("Searching Semantic Scholar: {}", url);

        let response = self
            .add_api_key_if_present(self.client.get(&url))
            .send()
            .await
            .map_err(|e| SourceError::Network(format!("Failed to search Semantic Scholar: {}", e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimit);
        }
        if !status.is_success() {
            return Err(SourceError::Api(format!(
                "Semantic Scholar API returned status: {}",
                status
            )));
        }

        let data: S2SearchResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Failed to parse JSON: {}", e)))?;

        let papers: Vec<PaperRecord> = data
            .data
            .into_iter()
            .filter(|p| p.title.as_deref().is_some_and(|t| !t.trim().is_empty()))
            .map(Self::parse_paper)
            .collect();

        tracing::debug!("Semantic Scholar returned {} of {} papers", papers.len(), data.total);
        Ok(SearchResponse::new(papers, data.total, data.offset, data.next))
    }
}

// ===== Semantic Scholar API Types =====

#[derive(Debug, Deserialize)]
struct S2Paper {
    #[serde(rename = "paperId")]
    paper_id: Option<String>,
    title: Option<String>,
    r#abstract: Option<String>,
    year: Option<i32>,
    venue: Option<String>,
    #[serde(default)]
    authors: Vec<S2Author>,
    #[serde(rename = "externalIds")]
    external_ids: Option<S2ExternalIds>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2Author {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2ExternalIds {
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

#[derive(Debug, Deserialize)]
struct S2SearchResponse {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    offset: usize,
    next: Option<usize>,
    #[serde(default)]
    data: Vec<S2Paper>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url_with_filters() {
        let index = SemanticScholarIndex::with_base_url("http://localhost/", None).unwrap();
        let query = SearchQuery::new("graph neural networks")
            .offset(20)
            .limit(500)
            .year("2019-2021")
            .venue("NeurIPS");

        assert_eq!(
            index.build_url(&query),
            "http://localhost/paper/search?query=graph%20neural%20networks&offset=20&limit=100\
             &fields=title,authors,year,venue,abstract,externalIds,url&year=2019-2021&venue=NeurIPS"
        );
    }

    #[test]
    fn test_parse_paper_maps_fields() {
        let raw = r#"{
            "paperId": "abc123",
            "title": "Attention Is All You Need",
            "abstract": "",
            "year": 2017,
            "venue": "NeurIPS",
            "authors": [{"name": "Ashish Vaswani"}, {"name": null}, {"name": "Noam Shazeer"}],
            "externalIds": {"DOI": "10.5555/3295222", "ArXiv": "1706.03762"},
            "url": "https://www.semanticscholar.org/paper/abc123"
        }"#;
        let paper = SemanticScholarIndex::parse_paper(serde_json::from_str(raw).unwrap());

        assert_eq!(paper.title, "Attention Is All You Need");
        assert_eq!(paper.authors, vec!["Ashish Vaswani", "Noam Shazeer"]);
        assert_eq!(paper.publication_year, Some(2017));
        assert_eq!(paper.journal.as_deref(), Some("NeurIPS"));
        assert_eq!(paper.r#abstract, None);
        assert_eq!(paper.doi.as_deref(), Some("10.5555/3295222"));
        assert_eq!(paper.external_id.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn test_search_parses_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/paper/search")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("query".into(), "transformers".into()),
                mockito::Matcher::UrlEncoded("offset".into(), "0".into()),
                mockito::Matcher::UrlEncoded("limit".into(), "2".into()),
            ]))
            .match_header("x-api-key", "secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"total": 57, "offset": 0, "next": 2, "data": [
                    {"paperId": "1", "title": "First", "year": 2020, "authors": []},
                    {"paperId": "2", "title": null, "authors": []},
                    {"paperId": "3", "title": "Third", "venue": "", "authors": [{"name": "A"}]}
                ]}"#,
            )
            .create_async()
            .await;

        let index = SemanticScholarIndex::with_base_url(server.url(), Some("secret".to_string())).unwrap();
        let response = index.search(&SearchQuery::new("transformers").limit(2)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.total, 57);
        assert_eq!(response.next, Some(2));
        let titles: Vec<&str> = response.papers.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Third"]);
        assert_eq!(response.papers[1].journal, None);
    }

    #[tokio::test]
    async fn test_search_rate_limited() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", mockito::Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let index = SemanticScholarIndex::with_base_url(server.url(), None).unwrap();
        let result = index.search(&SearchQuery::new("x")).await;
        assert!(matches!(result, Err(SourceError::RateLimit)));
    }

    #[tokio::test]
    async fn test_search_api_error_and_bad_json() {
        let mut server = mockito::Server::new_async().await;
        let _error = server
            .mock("GET", mockito::Matcher::Any)
            .match_query(mockito::Matcher::UrlEncoded("query".into(), "boom".into()))
            .with_status(500)
            .create_async()
            .await;
        let _garbage = server
            .mock("GET", mockito::Matcher::Any)
            .match_query(mockito::Matcher::UrlEncoded("query".into(), "garbage".into()))
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let index = SemanticScholarIndex::with_base_url(server.url(), None).unwrap();
        assert!(matches!(
            index.search(&SearchQuery::new("boom")).await,
            Err(SourceError::Api(_))
        ));
        assert!(matches!(
            index.search(&SearchQuery::new("garbage")).await,
            Err(SourceError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_query_rejected_without_request() {
        let index = SemanticScholarIndex::with_base_url("http://127.0.0.1:9", None).unwrap();
        let result = index.search(&SearchQuery::new("   ")).await;
        assert!(matches!(result, Err(SourceError::InvalidRequest(_))));
    }
}
