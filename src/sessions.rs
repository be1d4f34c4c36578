//! Session to conversation-id tracking
//!
//! The chat backend owns conversation history; the gateway only remembers
//! which backend conversation each caller session maps to. Entries are
//! replaced on every successful exchange and live for the life of the process.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

/// Session id used when a caller doesn't supply one
pub const DEFAULT_SESSION: &str = "default";

/// Shared session → conversation-id map
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    conversations: Arc<RwLock<HashMap<String, String>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Conversation id for `session`, or an empty string if it has none yet
    pub async fn conversation_id(&self, session: &str) -> String {
        self.conversations
            .read()
            .await
            .get(session)
            .cloned()
            .unwrap_or_default()
    }

    /// Remember the conversation id from the latest exchange
    pub async fn record(&self, session: &str, conversation_id: String) {
        self.conversations
            .write()
            .await
            .insert(session.to_string(), conversation_id);
    }

    /// Number of sessions with a conversation
    pub async fn len(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.conversations.read().await.is_empty()
    }
}
