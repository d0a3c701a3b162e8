//! # Paper Shelf
//!
//! Search an academic paper index, keep results in named lists, chat about a
//! list with a language model, and export citations.
//!
//! ## Architecture
//!
//! - [`models`]: Core data structures (PaperRecord, PaperList, SearchQuery, ChatMessage)
//! - [`utils`]: Search-term highlighting, citation formatting and export, search history
//! - [`store`]: Persistence for lists, saved papers and chat sessions
//! - [`sources`]: External paper index clients
//! - [`chat`]: Chat-completion endpoint client
//! - [`config`]: Configuration management
//! - [`ui`]: Terminal rendering

pub mod chat;
pub mod config;
pub mod models;
pub mod sources;
pub mod store;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use models::PaperRecord;
pub use store::PaperStore;
pub use utils::{CitationFormat, HighlightSpan};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
