//! Process-local store.

use std::sync::{Mutex, MutexGuard};

use super::{PaperStore, StoreError, Tables};
use crate::models::{ChatMessage, ChatSession, PaperList, PaperRecord, SavedPaper, StoredMessage};

/// Store that keeps its tables in memory only
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl PaperStore for MemoryStore {
    fn create_list(&self, name: &str, description: Option<&str>) -> Result<PaperList, StoreError> {
        self.tables()?.create_list(name, description)
    }

    fn lists(&self) -> Result<Vec<PaperList>, StoreError> {
        Ok(self.tables()?.lists())
    }

    fn get_list(&self, id: u64) -> Result<PaperList, StoreError> {
        self.tables()?.get_list(id)
    }

    fn find_list(&self, name: &str) -> Result<Option<PaperList>, StoreError> {
        Ok(self.tables()?.find_list(name))
    }

    fn rename_list(&self, id: u64, name: &str) -> Result<PaperList, StoreError> {
        self.tables()?.rename_list(id, name)
    }

    fn delete_list(&self, id: u64) -> Result<(), StoreError> {
        self.tables()?.delete_list(id)
    }

    fn add_paper(&self, list_id: u64, paper: PaperRecord) -> Result<SavedPaper, StoreError> {
        self.tables()?.add_paper(list_id, paper)
    }

    fn papers(&self, list_id: u64) -> Result<Vec<SavedPaper>, StoreError> {
        self.tables()?.papers(list_id)
    }

    fn remove_paper(&self, paper_id: u64) -> Result<(), StoreError> {
        self.tables()?.remove_paper(paper_id)
    }

    fn create_session(&self, list_id: u64, title: &str) -> Result<ChatSession, StoreError> {
        self.tables()?.create_session(list_id, title)
    }

    fn sessions(&self, list_id: u64) -> Result<Vec<ChatSession>, StoreError> {
        self.tables()?.sessions(list_id)
    }

    fn append_message(&self, session_id: u64, message: ChatMessage) -> Result<StoredMessage, StoreError> {
        self.tables()?.append_message(session_id, message)
    }

    fn messages(&self, session_id: u64) -> Result<Vec<StoredMessage>, StoreError> {
        self.tables()?.messages(session_id)
    }

    fn delete_session(&self, session_id: u64) -> Result<(), StoreError> {
        self.tables()?.delete_session(session_id)
    }
}
