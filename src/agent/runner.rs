//! Agent orchestration loop.
//!
//! Turns one user message into zero or more tool invocations and a final
//! answer. The loop is bounded, synchronous per conversation, and fails
//! closed: every internal error becomes a textual reply, never a fault
//! propagated to the caller.

use super::parser::{extract_calls, strip_tool_markup, Extraction};
use crate::error::Result;
use crate::llm::{CompletionProvider, SamplingConfig};
use crate::memory::{ConversationId, ConversationStore, Role, Turn};
use crate::tools::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Hard cap on model-call/tool-execution passes per user message.
///
/// Prevents unbounded ping-pong with a model that never stops requesting
/// tools; this is the loop's only cancellation mechanism.
pub const MAX_ITERATIONS: usize = 5;

/// Number of recent turns included in each prompt window.
pub const HISTORY_WINDOW: usize = 10;

/// Reply when the provider returns no content. A normal, reportable
/// outcome, not a fault.
pub const NO_RESPONSE_MESSAGE: &str =
    "I didn't get a response from the language model. Please try again.";

/// Reply when the iteration budget is exhausted.
pub const MAX_ITERATIONS_MESSAGE: &str =
    "Maximum tool iterations reached. Please try rephrasing your request.";

/// Reply for unexpected internal faults caught at the outermost boundary.
const INTERNAL_ERROR_MESSAGE: &str =
    "Something went wrong while handling your message. Please try again.";

/// Default personality and operating instructions, prepended to the tool
/// catalog to form the full system prompt.
const DEFAULT_PERSONA: &str = r#"You are Torii, a personal AI assistant.
You are efficient, smart, and always helpful.
You help your owner with files, coding, research, and anything they need.
You always confirm before deleting or modifying important files.

Use tools when a request needs information or actions you do not have.
When you have gathered enough information, answer in plain language
without any tool markup."#;

/// Tool-using conversational agent bound to one conversation.
pub struct Agent {
    provider: Arc<dyn CompletionProvider>,
    store: Arc<dyn ConversationStore>,
    registry: Arc<ToolRegistry>,
    conversation: ConversationId,
    persona: String,
    sampling: SamplingConfig,
    history_window: usize,
    max_iterations: usize,
}

impl Agent {
    /// Create an agent for the given conversation.
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        store: Arc<dyn ConversationStore>,
        registry: Arc<ToolRegistry>,
        conversation: ConversationId,
    ) -> Self {
        Self {
            provider,
            store,
            registry,
            conversation,
            persona: DEFAULT_PERSONA.to_string(),
            sampling: SamplingConfig::default(),
            history_window: HISTORY_WINDOW,
            max_iterations: MAX_ITERATIONS,
        }
    }

    /// Set a custom persona (the part of the system prompt before the
    /// tool catalog).
    pub fn with_persona(mut self, persona: &str) -> Self {
        self.persona = persona.to_string();
        self
    }

    /// Set sampling parameters.
    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    /// Set the prompt window size.
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    /// The conversation this agent is bound to.
    pub fn conversation(&self) -> &ConversationId {
        &self.conversation
    }

    /// Handle one user message, returning the final reply text.
    ///
    /// Total: never panics, never returns an error.
    pub async fn handle(&self, user_message: &str) -> String {
        match self.run(user_message).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Agent internal error: {}", e);
                INTERNAL_ERROR_MESSAGE.to_string()
            }
        }
    }

    /// Clear this agent's conversation history, returning a status
    /// message. Total.
    pub async fn reset(&self) -> String {
        self.store.clear(&self.conversation).await
    }

    fn system_prompt(&self) -> String {
        format!("{}\n\n{}", self.persona, self.registry.catalog())
    }

    async fn run(&self, user_message: &str) -> Result<String> {
        self.store
            .append(&self.conversation, Role::User, user_message)
            .await;

        let system = self.system_prompt();

        for iteration in 1..=self.max_iterations {
            debug!(
                "Agent iteration {}/{} for conversation {}",
                iteration, self.max_iterations, self.conversation
            );

            // The window is re-read from the store every pass, so tool
            // results persisted below are visible to the next model call.
            let mut window = self
                .store
                .recent(&self.conversation, self.history_window)
                .await;

            // A swallowed append failure could leave the window without
            // the message being handled; patch it in on the first pass.
            let has_user_message = window
                .last()
                .is_some_and(|t| t.role == Role::User && t.content == user_message);
            if iteration == 1 && !has_user_message {
                window.push(Turn::user(user_message));
            }

            let reply = match self
                .provider
                .complete(&system, &window, self.sampling)
                .await
            {
                Ok(Some(reply)) => reply,
                Ok(None) => return Ok(NO_RESPONSE_MESSAGE.to_string()),
                Err(e) => {
                    warn!("Completion provider failed: {}", e);
                    return Ok(NO_RESPONSE_MESSAGE.to_string());
                }
            };

            match extract_calls(&reply) {
                Extraction::NoMatch => {
                    self.store
                        .append(&self.conversation, Role::Assistant, &reply)
                        .await;
                    return Ok(strip_tool_markup(&reply));
                }
                Extraction::Calls(calls) => {
                    info!("Model requested {} tool call(s)", calls.len());
                    self.store
                        .append(&self.conversation, Role::Assistant, &reply)
                        .await;

                    let mut results = Vec::with_capacity(calls.len());
                    for call in &calls {
                        let output = self.registry.dispatch(&call.name, &call.raw_args).await;
                        results.push(format!("{}: {}", call.name, output));
                    }

                    let feedback = format!("Tool results:\n{}", results.join("\n"));
                    self.store
                        .append(&self.conversation, Role::User, &feedback)
                        .await;
                }
            }
        }

        Ok(MAX_ITERATIONS_MESSAGE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::SqliteConversationStore;
    use crate::tools::{Tool, ToolError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Provider that replays a scripted sequence of replies.
    struct ScriptedProvider {
        replies: Mutex<Vec<Option<String>>>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<Option<&str>>) -> Self {
            Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .rev()
                        .map(|r| r.map(String::from))
                        .collect(),
                ),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(
            &self,
            _system: &str,
            _turns: &[Turn],
            _sampling: SamplingConfig,
        ) -> Result<Option<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Some("fallback".to_string())))
        }
    }

    /// Tool that records its invocations.
    struct Recorder {
        invocations: Mutex<Vec<Vec<String>>>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                invocations: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl Tool for Recorder {
        fn name(&self) -> &str {
            "list_files"
        }

        fn description(&self) -> &str {
            "List files in a directory"
        }

        fn params(&self) -> &[&str] {
            &["directory"]
        }

        async fn invoke(&self, args: &[String]) -> std::result::Result<String, ToolError> {
            self.invocations.lock().unwrap().push(args.to_vec());
            Ok("notes.txt\ntodo.md".to_string())
        }
    }

    fn agent_with(
        provider: Arc<ScriptedProvider>,
        store: Arc<SqliteConversationStore>,
    ) -> Agent {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Recorder::new()));
        Agent::new(
            provider,
            store,
            Arc::new(registry),
            ConversationId::new("test"),
        )
    }

    #[tokio::test]
    async fn test_plain_reply_is_returned_and_persisted() {
        let provider = Arc::new(ScriptedProvider::new(vec![Some("Hello there!")]));
        let store = Arc::new(SqliteConversationStore::in_memory().unwrap());
        let agent = agent_with(provider.clone(), store.clone());

        let reply = agent.handle("hi").await;
        assert_eq!(reply, "Hello there!");
        assert_eq!(provider.call_count(), 1);

        let turns = store.recent(agent.conversation(), 10).await;
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content, "hi");
        assert_eq!(turns[1].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_tool_call_round_trip() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Some("<tool>\nTOOL: list_files\nARGS: .\n</tool>"),
            Some("You have notes.txt and todo.md."),
        ]));
        let store = Arc::new(SqliteConversationStore::in_memory().unwrap());
        let agent = agent_with(provider.clone(), store.clone());

        let reply = agent.handle("list files in .").await;
        assert_eq!(reply, "You have notes.txt and todo.md.");
        assert_eq!(provider.call_count(), 2);
        assert!(!reply.contains("<tool>"));

        let turns = store.recent(agent.conversation(), 10).await;
        // user, assistant (markup), tool results, assistant (final)
        assert_eq!(turns.len(), 4);
        assert!(turns[2].content.starts_with("Tool results:"));
        assert!(turns[2].content.contains("list_files:"));
        assert_eq!(turns[2].role, Role::User);
    }

    #[tokio::test]
    async fn test_tool_result_count_matches_extracted_calls() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Some(
                "<tool>\nTOOL: list_files\nARGS: a\n</tool>\n\
                 <tool>\nTOOL: list_files\nARGS: b\n</tool>",
            ),
            Some("done"),
        ]));
        let store = Arc::new(SqliteConversationStore::in_memory().unwrap());
        let agent = agent_with(provider, store.clone());

        agent.handle("check both").await;

        let turns = store.recent(agent.conversation(), 10).await;
        let feedback = turns
            .iter()
            .find(|t| t.content.starts_with("Tool results:"))
            .expect("tool results turn");
        let entries = feedback
            .content
            .lines()
            .filter(|l| l.starts_with("list_files:"))
            .count();
        assert_eq!(entries, 2);
    }

    #[tokio::test]
    async fn test_iteration_budget_is_enforced() {
        let looping = "<tool>\nTOOL: list_files\nARGS: .\n</tool>";
        let provider = Arc::new(ScriptedProvider::new(vec![
            Some(looping),
            Some(looping),
            Some(looping),
            Some(looping),
            Some(looping),
            // Never requested: the loop must stop at 5.
            Some("unreachable"),
        ]));
        let store = Arc::new(SqliteConversationStore::in_memory().unwrap());
        let agent = agent_with(provider.clone(), store);

        let reply = agent.handle("loop forever").await;
        assert_eq!(reply, MAX_ITERATIONS_MESSAGE);
        assert_eq!(provider.call_count(), 5);
    }

    #[tokio::test]
    async fn test_empty_completion_reports_no_response() {
        let provider = Arc::new(ScriptedProvider::new(vec![None]));
        let store = Arc::new(SqliteConversationStore::in_memory().unwrap());
        let agent = agent_with(provider.clone(), store.clone());

        let reply = agent.handle("hello?").await;
        assert_eq!(reply, NO_RESPONSE_MESSAGE);
        assert_eq!(provider.call_count(), 1);

        // No assistant turn persisted for the empty reply.
        let turns = store.recent(agent.conversation(), 10).await;
        assert_eq!(turns.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_feedback_not_failure() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Some("<tool>\nTOOL: launch_rocket\nARGS: now\n</tool>"),
            Some("I don't have that ability."),
        ]));
        let store = Arc::new(SqliteConversationStore::in_memory().unwrap());
        let agent = agent_with(provider, store.clone());

        let reply = agent.handle("launch!").await;
        assert_eq!(reply, "I don't have that ability.");

        let turns = store.recent(agent.conversation(), 10).await;
        let feedback = turns
            .iter()
            .find(|t| t.content.starts_with("Tool results:"))
            .expect("tool results turn");
        assert!(feedback.content.contains("Unknown tool: launch_rocket"));
    }

    #[tokio::test]
    async fn test_final_reply_markup_is_stripped() {
        // Final reply carries stray markup the dialects do not match as
        // calls; the cleanup pass must still remove it.
        let provider = Arc::new(ScriptedProvider::new(vec![Some(
            "All done.\n<tool>\nTOOL: read_file",
        )]));
        let store = Arc::new(SqliteConversationStore::in_memory().unwrap());
        let agent = agent_with(provider, store);

        let reply = agent.handle("finish up").await;
        assert_eq!(reply, "All done.");
    }

    #[tokio::test]
    async fn test_reset_clears_history() {
        let provider = Arc::new(ScriptedProvider::new(vec![Some("hi")]));
        let store = Arc::new(SqliteConversationStore::in_memory().unwrap());
        let agent = agent_with(provider, store.clone());

        agent.handle("hello").await;
        let status = agent.reset().await;
        assert!(status.contains("cleared"));

        let turns = store.recent(agent.conversation(), 10).await;
        assert!(turns.is_empty());
    }
}
