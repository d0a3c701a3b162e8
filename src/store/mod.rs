//! Persistence for paper lists, saved papers and chat history.
//!
//! Callers hold a [`PaperStore`] handle instead of reaching into ambient
//! storage. Two implementations are provided:
//!
//! - [`MemoryStore`]: process-local tables, used in tests and one-shot runs
//! - [`JsonStore`]: the same tables persisted to a JSON document
//!
//! Both share the table logic in [`Tables`], so they behave identically apart
//! from durability.

mod json;
mod memory;
mod tables;

pub use json::JsonStore;
pub use memory::MemoryStore;
pub use tables::Tables;

use thiserror::Error;

use crate::models::{ChatMessage, ChatSession, PaperList, PaperRecord, SavedPaper, StoredMessage};

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("List not found: {0}")]
    ListNotFound(u64),

    #[error("Paper not found: {0}")]
    PaperNotFound(u64),

    #[error("Chat session not found: {0}")]
    SessionNotFound(u64),

    #[error("A list named '{0}' already exists")]
    DuplicateList(String),

    #[error("'{0}' is already in this list")]
    DuplicatePaper(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// Operations over the paper-list tables
pub trait PaperStore: Send + Sync {
    // ========== LISTS ==========

    /// Create a new list; names are unique ignoring case
    fn create_list(&self, name: &str, description: Option<&str>) -> Result<PaperList, StoreError>;

    /// All lists in creation order
    fn lists(&self) -> Result<Vec<PaperList>, StoreError>;

    fn get_list(&self, id: u64) -> Result<PaperList, StoreError>;

    /// Look a list up by name, ignoring case
    fn find_list(&self, name: &str) -> Result<Option<PaperList>, StoreError>;

    fn rename_list(&self, id: u64, name: &str) -> Result<PaperList, StoreError>;

    /// Delete a list together with its papers and chat sessions
    fn delete_list(&self, id: u64) -> Result<(), StoreError>;

    // ========== PAPERS ==========

    fn add_paper(&self, list_id: u64, paper: PaperRecord) -> Result<SavedPaper, StoreError>;

    /// Papers of a list in the order they were added
    fn papers(&self, list_id: u64) -> Result<Vec<SavedPaper>, StoreError>;

    fn remove_paper(&self, paper_id: u64) -> Result<(), StoreError>;

    // ========== CHAT ==========

    fn create_session(&self, list_id: u64, title: &str) -> Result<ChatSession, StoreError>;

    fn sessions(&self, list_id: u64) -> Result<Vec<ChatSession>, StoreError>;

    fn append_message(&self, session_id: u64, message: ChatMessage) -> Result<StoredMessage, StoreError>;

    /// Messages of a session in conversation order
    fn messages(&self, session_id: u64) -> Result<Vec<StoredMessage>, StoreError>;

    fn delete_session(&self, session_id: u64) -> Result<(), StoreError>;

    // ========== HELPERS ==========

    /// Bare paper records of a list, ready for citation export or chat context
    fn paper_records(&self, list_id: u64) -> Result<Vec<PaperRecord>, StoreError> {
        Ok(self.papers(list_id)?.into_iter().map(|s| s.paper).collect())
    }
}
