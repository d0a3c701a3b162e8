//! In-memory tables shared by every store implementation.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::models::{ChatMessage, ChatSession, PaperList, PaperRecord, SavedPaper, StoredMessage};

/// Last id handed out per table
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Sequences {
    lists: u64,
    papers: u64,
    sessions: u64,
    messages: u64,
}

fn next_id(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}

fn normalize_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::InvalidName("name must not be empty".to_string()));
    }
    if name.chars().any(char::is_control) {
        return Err(StoreError::InvalidName("name contains control characters".to_string()));
    }
    Ok(name.to_string())
}

/// The paper-list tables and their id sequences
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    paper_lists: Vec<PaperList>,
    #[serde(default)]
    papers: Vec<SavedPaper>,
    #[serde(default)]
    chat_sessions: Vec<ChatSession>,
    #[serde(default)]
    chat_messages: Vec<StoredMessage>,
    #[serde(default)]
    sequences: Sequences,
}

impl Tables {
    fn name_taken(&self, name: &str, except: Option<u64>) -> bool {
        self.paper_lists
            .iter()
            .any(|l| Some(l.id) != except && l.name.to_lowercase() == name.to_lowercase())
    }

    fn require_list(&self, id: u64) -> Result<&PaperList, StoreError> {
        self.paper_lists
            .iter()
            .find(|l| l.id == id)
            .ok_or(StoreError::ListNotFound(id))
    }

    fn require_session(&self, id: u64) -> Result<&ChatSession, StoreError> {
        self.chat_sessions
            .iter()
            .find(|s| s.id == id)
            .ok_or(StoreError::SessionNotFound(id))
    }

    pub fn create_list(&mut self, name: &str, description: Option<&str>) -> Result<PaperList, StoreError> {
        let name = normalize_name(name)?;
        if self.name_taken(&name, None) {
            return Err(StoreError::DuplicateList(name));
        }

        let list = PaperList {
            id: next_id(&mut self.sequences.lists),
            name,
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            created_at: Utc::now(),
        };
        self.paper_lists.push(list.clone());
        Ok(list)
    }

    pub fn lists(&self) -> Vec<PaperList> {
        self.paper_lists.clone()
    }

    pub fn get_list(&self, id: u64) -> Result<PaperList, StoreError> {
        self.require_list(id).cloned()
    }

    pub fn find_list(&self, name: &str) -> Option<PaperList> {
        let name = name.trim().to_lowercase();
        self.paper_lists
            .iter()
            .find(|l| l.name.to_lowercase() == name)
            .cloned()
    }

    pub fn rename_list(&mut self, id: u64, name: &str) -> Result<PaperList, StoreError> {
        let name = normalize_name(name)?;
        if self.name_taken(&name, Some(id)) {
            return Err(StoreError::DuplicateList(name));
        }

        let list = self
            .paper_lists
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(StoreError::ListNotFound(id))?;
        list.name = name;
        Ok(list.clone())
    }

    pub fn delete_list(&mut self, id: u64) -> Result<(), StoreError> {
        self.require_list(id)?;

        let sessions: Vec<u64> = self
            .chat_sessions
            .iter()
            .filter(|s| s.list_id == id)
            .map(|s| s.id)
            .collect();

        self.chat_messages.retain(|m| !sessions.contains(&m.session_id));
        self.chat_sessions.retain(|s| s.list_id != id);
        self.papers.retain(|p| p.list_id != id);
        self.paper_lists.retain(|l| l.id != id);
        Ok(())
    }

    pub fn add_paper(&mut self, list_id: u64, paper: PaperRecord) -> Result<SavedPaper, StoreError> {
        self.require_list(list_id)?;

        let title = paper.title.trim().to_lowercase();
        if self
            .papers
            .iter()
            .any(|p| p.list_id == list_id && p.paper.title.trim().to_lowercase() == title)
        {
            return Err(StoreError::DuplicatePaper(paper.title));
        }

        let saved = SavedPaper {
            id: next_id(&mut self.sequences.papers),
            list_id,
            paper,
            added_at: Utc::now(),
        };
        self.papers.push(saved.clone());
        Ok(saved)
    }

    pub fn papers(&self, list_id: u64) -> Result<Vec<SavedPaper>, StoreError> {
        self.require_list(list_id)?;
        Ok(self
            .papers
            .iter()
            .filter(|p| p.list_id == list_id)
            .cloned()
            .collect())
    }

    pub fn remove_paper(&mut self, paper_id: u64) -> Result<(), StoreError> {
        let before = self.papers.len();
        self.papers.retain(|p| p.id != paper_id);
        if self.papers.len() == before {
            return Err(StoreError::PaperNotFound(paper_id));
        }
        Ok(())
    }

    pub fn create_session(&mut self, list_id: u64, title: &str) -> Result<ChatSession, StoreError> {
        self.require_list(list_id)?;
        let title = normalize_name(title)?;

        let session = ChatSession {
            id: next_id(&mut self.sequences.sessions),
            list_id,
            title,
            created_at: Utc::now(),
        };
        self.chat_sessions.push(session.clone());
        Ok(session)
    }

    pub fn sessions(&self, list_id: u64) -> Result<Vec<ChatSession>, StoreError> {
        self.require_list(list_id)?;
        Ok(self
            .chat_sessions
            .iter()
            .filter(|s| s.list_id == list_id)
            .cloned()
            .collect())
    }

    pub fn append_message(&mut self, session_id: u64, message: ChatMessage) -> Result<StoredMessage, StoreError> {
        self.require_session(session_id)?;

        let stored = StoredMessage {
            id: next_id(&mut self.sequences.messages),
            session_id,
            message,
            created_at: Utc::now(),
        };
        self.chat_messages.push(stored.clone());
        Ok(stored)
    }

    pub fn messages(&self, session_id: u64) -> Result<Vec<StoredMessage>, StoreError> {
        self.require_session(session_id)?;
        Ok(self
            .chat_messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect())
    }

    pub fn delete_session(&mut self, session_id: u64) -> Result<(), StoreError> {
        self.require_session(session_id)?;
        self.chat_messages.retain(|m| m.session_id != session_id);
        self.chat_sessions.retain(|s| s.id != session_id);
        Ok(())
    }
}
