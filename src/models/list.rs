//! Persisted records: paper lists, saved papers and chat sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ChatMessage, PaperRecord};

/// A named collection of saved papers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperList {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A paper saved into a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPaper {
    pub id: u64,
    pub list_id: u64,
    pub paper: PaperRecord,
    pub added_at: DateTime<Utc>,
}

/// A conversation about the contents of one list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: u64,
    pub list_id: u64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// A chat message stored against a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    pub id: u64,
    pub session_id: u64,
    #[serde(flatten)]
    pub message: ChatMessage,
    pub created_at: DateTime<Utc>,
}
