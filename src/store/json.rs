//! Store persisted to a single JSON document.
//!
//! The whole document is rewritten after every mutation. Writes go to a
//! sibling temporary file first and are then renamed into place.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::{PaperStore, StoreError, Tables};
use crate::models::{ChatMessage, ChatSession, PaperList, PaperRecord, SavedPaper, StoredMessage};

/// File-backed store
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    tables: Mutex<Tables>,
}

impl JsonStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let tables = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Tables::default()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Tables::default()
        };

        tracing::debug!("Opened paper store at {}", path.display());
        Ok(Self {
            path,
            tables: Mutex::new(tables),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Apply a mutation to a copy, persist it, then swap it in.
    ///
    /// Memory is left untouched when either step fails.
    fn write<T>(&self, op: impl FnOnce(&mut Tables) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let mut tables = self.tables()?;
        let mut next = tables.clone();
        let result = op(&mut next)?;
        self.persist(&next)?;
        *tables = next;
        Ok(result)
    }

    fn persist(&self, tables: &Tables) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(tables)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl PaperStore for JsonStore {
    fn create_list(&self, name: &str, description: Option<&str>) -> Result<PaperList, StoreError> {
        let list = self.write(|t| t.create_list(name, description))?;
        tracing::debug!("Created list {} ({})", list.id, list.name);
        Ok(list)
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
        self.write(|t| t.rename_list(id, name))
    }

    fn delete_list(&self, id: u64) -> Result<(), StoreError> {
        self.write(|t| t.delete_list(id))?;
        tracing::debug!("Deleted list {}", id);
        Ok(())
    }

    fn add_paper(&self, list_id: u64, paper: PaperRecord) -> Result<SavedPaper, StoreError> {
        self.write(|t| t.add_paper(list_id, paper))
    }

    fn papers(&self, list_id: u64) -> Result<Vec<SavedPaper>, StoreError> {
        self.tables()?.papers(list_id)
    }

    fn remove_paper(&self, paper_id: u64) -> Result<(), StoreError> {
        self.write(|t| t.remove_paper(paper_id))
    }

    fn create_session(&self, list_id: u64, title: &str) -> Result<ChatSession, StoreError> {
        self.write(|t| t.create_session(list_id, title))
    }

    fn sessions(&self, list_id: u64) -> Result<Vec<ChatSession>, StoreError> {
        self.tables()?.sessions(list_id)
    }

    fn append_message(&self, session_id: u64, message: ChatMessage) -> Result<StoredMessage, StoreError> {
        self.write(|t| t.append_message(session_id, message))
    }

    fn messages(&self, session_id: u64) -> Result<Vec<StoredMessage>, StoreError> {
        self.tables()?.messages(session_id)
    }

    fn delete_session(&self, session_id: u64) -> Result<(), StoreError> {
        self.write(|t| t.delete_session(session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaperBuilder;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty_store() {
        let dir = tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("store.json")).unwrap();
        assert!(store.lists().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_data_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data/store.json");

        let (list_id, session_id) = {
            let store = JsonStore::open(&path).unwrap();
            let list = store.create_list("Thesis", Some("chapter 2")).unwrap();
            store
                .add_paper(list.id, PaperBuilder::new("Deep Residual Learning").year(2016).build())
                .unwrap();
            let session = store.create_session(list.id, "Summary").unwrap();
            store.append_message(session.id, ChatMessage::user("summarize")).unwrap();
            (list.id, session.id)
        };

        let store = JsonStore::open(&path).unwrap();
        let list = store.find_list("thesis").unwrap().unwrap();
        assert_eq!(list.id, list_id);
        assert_eq!(list.description.as_deref(), Some("chapter 2"));

        let papers = store.paper_records(list_id).unwrap();
        assert_eq!(papers[0].title, "Deep Residual Learning");
        assert_eq!(papers[0].publication_year, Some(2016));
        assert_eq!(store.messages(session_id).unwrap()[0].message.content, "summarize");

        // Sequences persist too.
        let next = store.create_list("Another", None).unwrap();
        assert!(next.id > list_id);
    }

    #[test]
    fn test_failed_mutation_does_not_persist() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = JsonStore::open(&path).unwrap();

        assert!(store.add_paper(42, PaperBuilder::new("T").build()).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_persist_leaves_store_unchanged() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        let store = JsonStore::open(blocker.join("store.json")).unwrap();

        assert!(matches!(store.create_list("Reading", None), Err(StoreError::Io(_))));
        assert!(store.lists().unwrap().is_empty());

        // Once the path is writable the same call succeeds.
        fs::remove_file(&blocker).unwrap();
        let list = store.create_list("Reading", None).unwrap();
        assert_eq!(store.lists().unwrap(), vec![list]);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(JsonStore::open(&path), Err(StoreError::Serialize(_))));
    }
}
