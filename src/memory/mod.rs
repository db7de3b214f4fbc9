//! Conversation memory abstraction.
//!
//! Stores the append-only, role-tagged conversation log the agent reads
//! its prompt window from. Implementations must tolerate their own
//! failures: appends are swallow-and-log, reads degrade to an empty
//! window, so a broken store never interrupts a running conversation.

mod sqlite;

pub use sqlite::SqliteConversationStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Stable string form used for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "system" => Ok(Role::System),
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// One immutable role-tagged message in the conversation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Identifier keying a conversation in the store.
///
/// Every store call takes one explicitly; there is no ambient "current
/// conversation" anywhere in the crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConversationId {
    /// The conversation used by the interactive CLI.
    fn default() -> Self {
        Self("cli".to_string())
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persistent conversation store.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Append a turn. Never raises: failures are logged and dropped so a
    /// persistence outage cannot abort the agent loop.
    async fn append(&self, conversation: &ConversationId, role: Role, content: &str);

    /// The most recent `limit` turns, oldest first. Empty on failure.
    async fn recent(&self, conversation: &ConversationId, limit: usize) -> Vec<Turn>;

    /// Delete all turns for the conversation, returning a status message.
    async fn clear(&self, conversation: &ConversationId) -> String;
}
