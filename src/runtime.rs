//! Wiring of settings into the agent's collaborators.
//!
//! One `Runtime` per process; agents are cheap to create from it, one
//! per conversation.

use crate::agent::Agent;
use crate::config::Settings;
use crate::error::Result;
use crate::llm::{CompletionProvider, OpenAiProvider, SamplingConfig};
use crate::memory::{ConversationId, ConversationStore, SqliteConversationStore};
use crate::tools::{default_registry, ToolRegistry};
use std::sync::Arc;

/// Shared collaborators built from settings.
pub struct Runtime {
    settings: Settings,
    store: Arc<dyn ConversationStore>,
    provider: Arc<dyn CompletionProvider>,
    registry: Arc<ToolRegistry>,
}

impl Runtime {
    /// Build the runtime from settings, opening the conversation store.
    pub fn new(settings: Settings) -> Result<Self> {
        let store: Arc<dyn ConversationStore> =
            Arc::new(SqliteConversationStore::new(&settings.sqlite_path())?);
        let provider: Arc<dyn CompletionProvider> = Arc::new(OpenAiProvider::new(&settings.llm));
        let registry = Arc::new(default_registry(&settings));

        Ok(Self {
            settings,
            store,
            provider,
            registry,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> Arc<dyn ConversationStore> {
        self.store.clone()
    }

    /// Create an agent bound to the given conversation.
    pub fn agent_for(&self, conversation: ConversationId) -> Agent {
        Agent::new(
            self.provider.clone(),
            self.store.clone(),
            self.registry.clone(),
            conversation,
        )
        .with_sampling(SamplingConfig {
            temperature: self.settings.llm.temperature,
            max_tokens: self.settings.llm.max_tokens,
        })
        .with_history_window(self.settings.memory.history_window)
    }
}
