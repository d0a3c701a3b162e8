//! Search-term highlighting for titles and abstracts.
//!
//! The highlighter partitions a body of text into [`HighlightSpan`]s, tagging
//! every occurrence of any search term as a match. Matching is
//! case-insensitive and substring based; terms are treated as literals, so
//! arbitrary user query text can never break the matcher.
//!
//! Concatenating the text of the returned spans always reproduces the
//! (possibly truncated) input exactly.
//!
//! ```
//! use paper_shelf::utils::{highlight, HighlightSpan};
//!
//! let spans = highlight("Machine Learning is great", &["machine learning"], None);
//! assert_eq!(spans[0], HighlightSpan::Match("Machine Learning".to_string()));
//! assert_eq!(spans[1], HighlightSpan::Plain(" is great".to_string()));
//! ```

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;

/// Marker appended to text cut short by [`truncate`].
pub const ELLIPSIS: &str = "...";

/// A run of text tagged as plain or as matching a search term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum HighlightSpan {
    Plain(String),
    Match(String),
}

impl HighlightSpan {
    pub fn text(&self) -> &str {
        match self {
            HighlightSpan::Plain(text) | HighlightSpan::Match(text) => text,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, HighlightSpan::Match(_))
    }
}

/// Normalized set of search terms: lower-cased, trimmed, non-empty, unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerms {
    // Longest first so that leftmost-first alternation picks the longest
    // term among those starting at the same position.
    terms: Vec<String>,
}

impl SearchTerms {
    /// Normalize an explicit list of terms
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unique: BTreeSet<String> = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        let mut terms: Vec<String> = unique.into_iter().collect();
        terms.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then_with(|| a.cmp(b)));

        Self { terms }
    }

    /// Split a free-text query on whitespace
    pub fn from_query(query: &str) -> Self {
        Self::new(query.split_whitespace())
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// Build a case-insensitive alternation of the escaped terms.
    fn matcher(&self) -> Option<Regex> {
        if self.terms.is_empty() {
            return None;
        }

        let pattern = self
            .terms
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");

        match RegexBuilder::new(&pattern).case_insensitive(true).build() {
            Ok(re) => Some(re),
            Err(e) => {
                tracing::warn!("Could not build highlight matcher for {} terms: {}", self.terms.len(), e);
                None
            }
        }
    }
}

/// Reusable highlighter for a fixed set of terms.
///
/// Compiles the matcher once, which matters when rendering a whole page of
/// search results against the same query.
#[derive(Debug, Clone)]
pub struct Highlighter {
    matcher: Option<Regex>,
}

impl Highlighter {
    pub fn new(terms: &SearchTerms) -> Self {
        Self {
            matcher: terms.matcher(),
        }
    }

    /// Highlighter for the whitespace-separated words of a query
    pub fn for_query(query: &str) -> Self {
        Self::new(&SearchTerms::from_query(query))
    }

    /// Partition `text` into plain and matching spans.
    ///
    /// Truncation to `max_length` characters (plus [`ELLIPSIS`]) happens
    /// before matching, so a term cut by the boundary is not reconstructed.
    pub fn highlight(&self, text: &str, max_length: Option<usize>) -> Vec<HighlightSpan> {
        if text.is_empty() {
            return Vec::new();
        }

        let text = truncate(text, max_length);

        let Some(matcher) = &self.matcher else {
            return vec![HighlightSpan::Plain(text.into_owned())];
        };

        let mut spans = Vec::new();
        let mut last = 0;

        for m in matcher.find_iter(&text) {
            if m.start() > last {
                spans.push(HighlightSpan::Plain(text[last..m.start()].to_string()));
            }
            spans.push(HighlightSpan::Match(m.as_str().to_string()));
            last = m.end();
        }

        if last < text.len() {
            spans.push(HighlightSpan::Plain(text[last..].to_string()));
        }

        spans
    }
}

/// Highlight occurrences of `search_terms` in `text`.
///
/// `max_length` of `None` or `Some(0)` disables truncation.
pub fn highlight<S: AsRef<str>>(
    text: &str,
    search_terms: &[S],
    max_length: Option<usize>,
) -> Vec<HighlightSpan> {
    Highlighter::new(&SearchTerms::new(search_terms)).highlight(text, max_length)
}

/// Cut `text` to `max_length` characters and append [`ELLIPSIS`].
///
/// Text that already fits is borrowed unchanged.
pub fn truncate(text: &str, max_length: Option<usize>) -> Cow<'_, str> {
    match max_length {
        Some(max) if max > 0 => match text.char_indices().nth(max) {
            Some((cut, _)) => Cow::Owned(format!("{}{}", &text[..cut], ELLIPSIS)),
            None => Cow::Borrowed(text),
        },
        _ => Cow::Borrowed(text),
    }
}

/// Concatenate the text of a span sequence.
pub fn spans_text(spans: &[HighlightSpan]) -> String {
    spans.iter().map(HighlightSpan::text).collect()
}
