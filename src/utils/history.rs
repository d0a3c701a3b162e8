//! Recent-search history.
//!
//! Searches are appended to a JSON-lines file. The path is injected so callers
//! decide where history lives; [`HistoryService::new`] defaults to the user
//! data directory.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// A single recorded search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchEntry {
    /// Timestamp (Unix epoch seconds)
    pub timestamp: i64,
    /// Query as typed
    pub query: String,
    /// Number of results returned
    #[serde(default)]
    pub results: Option<usize>,
}

/// History service
#[derive(Debug, Clone)]
pub struct HistoryService {
    path: PathBuf,
}

impl HistoryService {
    /// History in the default data directory
    pub fn new() -> Self {
        Self::with_path(crate::config::default_data_dir().join("history.jsonl"))
    }

    /// History stored at `path`
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_file(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        if !self.path.exists() {
            File::create(&self.path)?;
        }
        Ok(())
    }

    /// Record a search
    pub fn add_search(&self, query: &str, results: Option<usize>) -> io::Result<()> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }

        self.ensure_file()?;
        let entry = SearchEntry {
            timestamp: chrono::Utc::now().timestamp(),
            query: query.to_string(),
            results,
        };

        let mut file = fs::OpenOptions::new().append(true).open(&self.path)?;
        let json = serde_json::to_string(&entry)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }

    /// Most recent searches, newest first, one entry per query
    pub fn recent(&self, limit: usize) -> io::Result<Vec<SearchEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut entries: Vec<SearchEntry> = Vec::new();

        for line in reader.lines() {
            let line = line?;
            match serde_json::from_str(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::debug!("Skipping malformed history line: {}", e),
            }
        }

        let mut seen = HashSet::new();
        Ok(entries
            .into_iter()
            .rev()
            .filter(|e| seen.insert(e.query.to_lowercase()))
            .take(limit)
            .collect())
    }

    /// Clear history
    pub fn clear(&self) -> io::Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for HistoryService {
    fn default() -> Self {
        Self::new()
    }
}
