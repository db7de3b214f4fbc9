//! Completion provider abstraction and OpenAI-compatible implementation.
//!
//! The agent loop only needs one operation: given the system instructions
//! and an ordered window of turns, produce one assistant message. An
//! empty reply is a normal, reportable outcome (`Ok(None)`), distinct
//! from a transport failure.

use crate::config::LlmSettings;
use crate::error::{Result, ToriiError};
use crate::memory::{Role, Turn};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Fixed sampling parameters for a completion call.
#[derive(Debug, Clone, Copy)]
pub struct SamplingConfig {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

/// Source of assistant completions.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Request one assistant message for the given prompt.
    ///
    /// Returns `Ok(None)` when the model produced no content.
    async fn complete(
        &self,
        system: &str,
        turns: &[Turn],
        sampling: SamplingConfig,
    ) -> Result<Option<String>>;
}

/// Completion provider backed by an OpenAI-compatible chat endpoint.
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiProvider {
    /// Create a provider from LLM settings.
    pub fn new(settings: &LlmSettings) -> Self {
        let mut config = OpenAIConfig::default();
        if let Some(base_url) = &settings.base_url {
            config = config.with_api_base(base_url);
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .unwrap_or_default();

        Self {
            client: Client::with_config(config).with_http_client(http_client),
            model: settings.model.clone(),
        }
    }

    /// Convert stored turns into chat request messages.
    fn build_messages(system: &str, turns: &[Turn]) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| ToriiError::Provider(e.to_string()))?
                .into(),
        ];

        for turn in turns {
            let message = match turn.role {
                // Stored system turns do not exist, but map them anyway
                // rather than dropping content on the floor.
                Role::System => ChatCompletionRequestSystemMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| ToriiError::Provider(e.to_string()))?
                    .into(),
                Role::User => ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| ToriiError::Provider(e.to_string()))?
                    .into(),
                Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(turn.content.clone())
                    .build()
                    .map_err(|e| ToriiError::Provider(e.to_string()))?
                    .into(),
            };
            messages.push(message);
        }

        Ok(messages)
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(
        &self,
        system: &str,
        turns: &[Turn],
        sampling: SamplingConfig,
    ) -> Result<Option<String>> {
        let messages = Self::build_messages(system, turns)?;

        debug!(
            "Requesting completion from {} with {} messages",
            self.model,
            messages.len()
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(sampling.temperature)
            .max_tokens(sampling.max_tokens)
            .build()
            .map_err(|e| ToriiError::Provider(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ToriiError::Provider(format!("Chat API error: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|c| !c.trim().is_empty());

        Ok(content)
    }
}
