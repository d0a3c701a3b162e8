//! Core data models for papers, lists, search and chat.

mod chat;
mod list;
mod paper;
mod search;

pub use chat::{ChatMessage, Role};
pub use list::{ChatSession, PaperList, SavedPaper, StoredMessage};
pub use paper::{PaperBuilder, PaperRecord};
pub use search::{SearchQuery, SearchResponse};
