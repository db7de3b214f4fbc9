//! SQLite-based conversation store implementation.

use super::{ConversationId, ConversationStore, Role, Turn};
use crate::error::{Result, ToriiError};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, error, info, instrument};

/// SQLite-backed conversation store.
pub struct SqliteConversationStore {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS turns (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    conversation_id TEXT NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_turns_conversation ON turns(conversation_id, id);
"#;

impl SqliteConversationStore {
    /// Create a new SQLite conversation store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized conversation store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory conversation store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn try_append(&self, conversation: &ConversationId, role: Role, content: &str) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ToriiError::Memory(format!("Failed to acquire lock: {}", e)))?;

        conn.execute(
            "INSERT INTO turns (conversation_id, role, content, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                conversation.as_str(),
                role.as_str(),
                content,
                Utc::now().to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn try_recent(&self, conversation: &ConversationId, limit: usize) -> Result<Vec<Turn>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ToriiError::Memory(format!("Failed to acquire lock: {}", e)))?;

        let mut stmt = conn.prepare(
            r#"
            SELECT role, content FROM turns
            WHERE conversation_id = ?1
            ORDER BY id DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt.query_map(params![conversation.as_str(), limit as i64], |row| {
            let role_str: String = row.get(0)?;
            let content: String = row.get(1)?;
            Ok((role_str, content))
        })?;

        // Query returns newest first; the prompt wants oldest first.
        let mut turns: Vec<Turn> = rows
            .filter_map(|r| r.ok())
            .filter_map(|(role_str, content)| {
                role_str.parse::<Role>().ok().map(|role| Turn::new(role, content))
            })
            .collect();
        turns.reverse();

        debug!(
            "Read {} turns for conversation {}",
            turns.len(),
            conversation
        );
        Ok(turns)
    }

    fn try_clear(&self, conversation: &ConversationId) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ToriiError::Memory(format!("Failed to acquire lock: {}", e)))?;

        let deleted = conn.execute(
            "DELETE FROM turns WHERE conversation_id = ?1",
            params![conversation.as_str()],
        )?;

        info!("Cleared {} turns for conversation {}", deleted, conversation);
        Ok(deleted)
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn append(&self, conversation: &ConversationId, role: Role, content: &str) {
        if let Err(e) = self.try_append(conversation, role, content) {
            error!("Failed to persist {} turn: {}", role.as_str(), e);
        }
    }

    async fn recent(&self, conversation: &ConversationId, limit: usize) -> Vec<Turn> {
        match self.try_recent(conversation, limit) {
            Ok(turns) => turns,
            Err(e) => {
                error!("Failed to read conversation history: {}", e);
                Vec::new()
            }
        }
    }

    async fn clear(&self, conversation: &ConversationId) -> String {
        match self.try_clear(conversation) {
            Ok(deleted) => format!("Memory cleared ({} turns deleted).", deleted),
            Err(e) => format!("Error clearing memory: {}", e),
        }
    }
}
