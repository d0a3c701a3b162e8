//! Client for the chat-completion endpoint.
//!
//! The endpoint accepts the conversation so far plus the papers of the list
//! being discussed and replies with a single completion:
//!
//! ```text
//! POST {"messages": [{"role": "user", "content": "..."}], "papers": [...]}
//!   -> {"message": "..."} | {"error": "..."}
//! ```

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::{ChatMessage, ChatSession, PaperList, PaperRecord};
use crate::store::{PaperStore, StoreError};

/// Chat errors
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Conversation has no messages")]
    EmptyConversation,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Chat endpoint returned status {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Chat endpoint reported an error: {0}")]
    Remote(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
    papers: &'a [PaperRecord],
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChatReply {
    Message { message: String },
    Error { error: String },
}

/// HTTP client for the chat endpoint
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Arc<Client>,
    endpoint: String,
    api_key: Option<String>,
}

impl ChatClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self, ChatError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Network(e.to_string()))?;

        Ok(Self {
            client: Arc::new(client),
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send the conversation and return the assistant's reply
    pub async fn send(&self, messages: &[ChatMessage], papers: &[PaperRecord]) -> Result<String, ChatError> {
        if messages.is_empty() {
            return Err(ChatError::EmptyConversation);
        }

        tracing::debug!(
            "Sending {} messages with {} papers to {}",
            messages.len(),
            papers.len(),
            self.endpoint
        );

        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { messages, papers });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Network(e.to_string()))?;

        // Error payloads may arrive with either a success or failure status.
        match serde_json::from_str::<ChatReply>(&body) {
            Ok(ChatReply::Error { error }) => Err(ChatError::Remote(error)),
            _ if !status.is_success() => Err(ChatError::Http {
                status: status.as_u16(),
                body,
            }),
            Ok(ChatReply::Message { message }) => Ok(message),
            Err(e) => Err(ChatError::Parse(e.to_string())),
        }
    }
}

/// One answered question and the session it was recorded in
#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub session: ChatSession,
    pub reply: String,
}

impl ChatClient {
    /// Ask a question about `list`, continuing `session` or starting a new
    /// session titled `title`.
    ///
    /// Nothing is written to the store unless the endpoint answers.
    pub async fn ask(
        &self,
        store: &dyn PaperStore,
        list: &PaperList,
        session: Option<u64>,
        title: &str,
        question: &str,
    ) -> Result<ChatTurn, ChatError> {
        let papers = store.paper_records(list.id)?;
        let existing = match session {
            Some(id) => Some(
                store
                    .sessions(list.id)?
                    .into_iter()
                    .find(|s| s.id == id)
                    .ok_or(StoreError::SessionNotFound(id))?,
            ),
            None => None,
        };

        let mut conversation = vec![system_prompt(&list.name, &papers)];
        if let Some(session) = &existing {
            conversation.extend(store.messages(session.id)?.into_iter().map(|m| m.message));
        }
        let question = ChatMessage::user(question);
        conversation.push(question.clone());

        let reply = self.send(&conversation, &papers).await?;

        let session = match existing {
            Some(session) => session,
            None => store.create_session(list.id, title)?,
        };
        store.append_message(session.id, question)?;
        store.append_message(session.id, ChatMessage::assistant(&reply))?;

        Ok(ChatTurn { session, reply })
    }
}

/// System prompt introducing the papers of a list
pub fn system_prompt(list_name: &str, papers: &[PaperRecord]) -> ChatMessage {
    let titles = papers
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}. {}", i + 1, p.title))
        .collect::<Vec<_>>()
        .join("\n");

    ChatMessage::system(format!(
        "You are a research assistant helping with the paper list \"{}\". \
         Answer using the provided papers and say when they do not cover a question.\n\nPapers:\n{}",
        list_name, titles
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaperBuilder;
    use crate::store::MemoryStore;

    fn client(url: &str) -> ChatClient {
        ChatClient::new(url, Some("token".to_string()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_send_returns_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .match_header("authorization", "Bearer token")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "messages": [{"role": "user", "content": "What is this about?"}],
                "papers": [{
                    "title": "T",
                    "authors": [],
                    "abstract": null,
                    "publicationYear": 2020,
                    "journal": null
                }]
            })))
            .with_status(200)
            .with_body(r#"{"message": "It is about T."}"#)
            .create_async()
            .await;

        let papers = vec![PaperBuilder::new("T").year(2020).build()];
        let reply = client(&format!("{}/chat", server.url()))
            .send(&[ChatMessage::user("What is this about?")], &papers)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(reply, "It is about T.");
    }

    #[tokio::test]
    async fn test_send_surfaces_remote_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat")
            .with_status(500)
            .with_body(r#"{"error": "model overloaded"}"#)
            .create_async()
            .await;

        let result = client(&format!("{}/chat", server.url()))
            .send(&[ChatMessage::user("hi")], &[])
            .await;
        assert!(matches!(result, Err(ChatError::Remote(e)) if e == "model overloaded"));
    }

    #[tokio::test]
    async fn test_send_http_and_parse_errors() {
        let mut server = mockito::Server::new_async().await;
        let _bad_gateway = server
            .mock("POST", "/down")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;
        let _garbage = server
            .mock("POST", "/garbage")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let result = client(&format!("{}/down", server.url()))
            .send(&[ChatMessage::user("hi")], &[])
            .await;
        assert!(matches!(result, Err(ChatError::Http { status: 502, .. })));

        let result = client(&format!("{}/garbage", server.url()))
            .send(&[ChatMessage::user("hi")], &[])
            .await;
        assert!(matches!(result, Err(ChatError::Parse(_))));
    }

    #[tokio::test]
    async fn test_empty_conversation_rejected() {
        let result = client("http://127.0.0.1:9/chat").send(&[], &[]).await;
        assert!(matches!(result, Err(ChatError::EmptyConversation)));
    }

    #[tokio::test]
    async fn test_failed_ask_records_nothing() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat")
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let store = MemoryStore::new();
        let list = store.create_list("Reading", None).unwrap();

        let result = client(&format!("{}/chat", server.url()))
            .ask(&store, &list, None, "hi", "hi")
            .await;
        assert!(matches!(result, Err(ChatError::Http { status: 500, .. })));
        assert!(store.sessions(list.id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ask_starts_then_continues_session() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body(r#"{"message": "Noted."}"#)
            .expect(2)
            .create_async()
            .await;

        let store = MemoryStore::new();
        let list = store.create_list("Reading", None).unwrap();
        let chat = client(&format!("{}/chat", server.url()));

        let first = chat.ask(&store, &list, None, "Start", "first").await.unwrap();
        assert_eq!(first.reply, "Noted.");
        assert_eq!(first.session.title, "Start");

        let second = chat
            .ask(&store, &list, Some(first.session.id), "ignored", "second")
            .await
            .unwrap();
        assert_eq!(second.session, first.session);

        let contents: Vec<String> = store
            .messages(first.session.id)
            .unwrap()
            .into_iter()
            .map(|m| m.message.content)
            .collect();
        assert_eq!(contents, vec!["first", "Noted.", "second", "Noted."]);
        assert_eq!(store.sessions(list.id).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ask_unknown_session() {
        let store = MemoryStore::new();
        let list = store.create_list("Reading", None).unwrap();

        let result = client("http://127.0.0.1:9/chat")
            .ask(&store, &list, Some(7), "t", "q")
            .await;
        assert!(matches!(result, Err(ChatError::Store(StoreError::SessionNotFound(7)))));
    }

    #[test]
    fn test_system_prompt_lists_titles() {
        let papers = vec![PaperRecord::new("Alpha"), PaperRecord::new("Beta")];
        let prompt = system_prompt("Reading", &papers);
        assert_eq!(prompt.role, crate::models::Role::System);
        assert!(prompt.content.contains("\"Reading\""));
        assert!(prompt.content.ends_with("1. Alpha\n2. Beta"));
    }
}
