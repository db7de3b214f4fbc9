//! Tool catalog and registry for the agent.
//!
//! Tools are named local actions with a fixed declared arity. The
//! registry owns the catalog text the model sees, the name lookup, and
//! the invocation boundary: `dispatch` never fails, it returns error text
//! instead so a bad tool call degrades into feedback the model can react
//! to.

mod browser;
mod code;
mod fs;
mod system;
mod web;

pub use browser::{
    BrowserClick, BrowserClose, BrowserOpen, BrowserScreenshot, BrowserText, BrowserType,
    DevtoolsSession,
};
pub use code::RunPython;
pub use fs::{CreateFile, CreateFolder, DeleteFile, ListFiles, MoveFile, ReadFile};
pub use system::SystemInfo;
pub use web::{FetchWebpage, SearchWeb};

use crate::agent::resolve_args;
use crate::config::Settings;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Error raised by a tool invocation.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The argument list does not match the tool's declared arity.
    #[error("expected {expected} argument(s), got {got}")]
    Arity { expected: usize, got: usize },

    /// The tool ran but failed internally (I/O, network, subprocess).
    #[error("{0}")]
    Failed(String),
}

impl ToolError {
    pub fn failed(msg: impl std::fmt::Display) -> Self {
        ToolError::Failed(msg.to_string())
    }
}

/// A named, fixed-arity local action invocable by the agent.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Tool identifier. Lowercase alphanumeric/underscore.
    fn name(&self) -> &str;

    /// One-line description shown to the model in the catalog.
    fn description(&self) -> &str;

    /// Declared positional parameter names. The length is the arity.
    fn params(&self) -> &[&str];

    /// Invoke with positional arguments.
    async fn invoke(&self, args: &[String]) -> std::result::Result<String, ToolError>;
}

/// Registry of available tools, keyed by case-insensitive name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Later registrations shadow earlier ones by name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_lowercase();
        self.tools.push(tool);
        self.index.insert(name, self.tools.len() - 1);
    }

    /// Look up a tool by case-insensitive name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index
            .get(&name.to_lowercase())
            .map(|&i| &self.tools[i])
    }

    /// Declared arity of a tool, if registered.
    pub fn arity_of(&self, name: &str) -> Option<usize> {
        self.get(name).map(|t| t.params().len())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Render the tool catalog section of the system prompt.
    ///
    /// The format here is the other half of the parser's contract: the
    /// model is instructed to emit exactly the markup
    /// `agent::parser::extract_calls` accepts.
    pub fn catalog(&self) -> String {
        let mut lines = vec![
            "You have access to these tools. Use EXACTLY this format:".to_string(),
            "<tool>".to_string(),
            "TOOL: tool_name".to_string(),
            "ARGS: argument1 | argument2".to_string(),
            "</tool>".to_string(),
            String::new(),
            "Pass ARGS: none for tools that take no arguments.".to_string(),
            "You can output multiple <tool> blocks at once to perform actions sequentially."
                .to_string(),
            String::new(),
            "Tools:".to_string(),
        ];

        for tool in &self.tools {
            lines.push(format!(
                "- {}({}): {}",
                tool.name(),
                tool.params().join(", "),
                tool.description()
            ));
        }

        lines.join("\n")
    }

    /// Resolve arguments and invoke a tool, absorbing every failure into
    /// a textual result.
    ///
    /// An arity mismatch is retried once with zero arguments, which
    /// tolerates tools with optional parameters and models that omit
    /// required ones.
    pub async fn dispatch(&self, name: &str, raw_args: &str) -> String {
        let Some(tool) = self.get(name) else {
            warn!("Unknown tool requested: {}", name);
            return format!("Unknown tool: {}", name);
        };

        let args = resolve_args(raw_args, Some(tool.params().len()));
        info!("Invoking tool {} with {} argument(s)", tool.name(), args.len());

        match tool.invoke(&args).await {
            Ok(output) => output,
            Err(ToolError::Arity { .. }) => match tool.invoke(&[]).await {
                Ok(output) => output,
                Err(e) => format!("Error: {}", e),
            },
            Err(e) => format!("Error: {}", e),
        }
    }
}

/// Build the default tool catalog from settings.
pub fn default_registry(settings: &Settings) -> ToolRegistry {
    let workspace = settings.workspace_dir();
    let devtools = Arc::new(DevtoolsSession::new(settings.tools.devtools_port));

    let mut registry = ToolRegistry::new();

    registry.register(Arc::new(CreateFile::new(&workspace)));
    registry.register(Arc::new(ReadFile::new(&workspace)));
    registry.register(Arc::new(DeleteFile::new(&workspace)));
    registry.register(Arc::new(ListFiles::new(&workspace)));
    registry.register(Arc::new(CreateFolder::new(&workspace)));
    registry.register(Arc::new(MoveFile::new(&workspace)));

    registry.register(Arc::new(SearchWeb::new(settings.serper_api_key())));
    registry.register(Arc::new(FetchWebpage::new()));

    registry.register(Arc::new(RunPython::new(
        &settings.tools.python_bin,
        settings.tools.code_timeout_seconds,
    )));
    registry.register(Arc::new(SystemInfo));

    registry.register(Arc::new(BrowserOpen::new(devtools.clone())));
    registry.register(Arc::new(BrowserClick::new(devtools.clone())));
    registry.register(Arc::new(BrowserType::new(devtools.clone())));
    registry.register(Arc::new(BrowserText::new(devtools.clone())));
    registry.register(Arc::new(BrowserScreenshot::new(devtools.clone(), &workspace)));
    registry.register(Arc::new(BrowserClose::new(devtools)));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait::async_trait]
    impl Tool for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the argument back"
        }

        fn params(&self) -> &[&str] {
            &["text"]
        }

        async fn invoke(&self, args: &[String]) -> std::result::Result<String, ToolError> {
            match args.first() {
                Some(text) => Ok(text.clone()),
                None => Err(ToolError::Arity {
                    expected: 1,
                    got: 0,
                }),
            }
        }
    }

    struct Strict;

    #[async_trait::async_trait]
    impl Tool for Strict {
        fn name(&self) -> &str {
            "strict"
        }

        fn description(&self) -> &str {
            "Requires exactly two arguments"
        }

        fn params(&self) -> &[&str] {
            &["a", "b"]
        }

        async fn invoke(&self, args: &[String]) -> std::result::Result<String, ToolError> {
            if args.len() != 2 {
                return Err(ToolError::Arity {
                    expected: 2,
                    got: args.len(),
                });
            }
            Ok(format!("{}+{}", args[0], args[1]))
        }
    }

    fn registry() -> ToolRegistry {
        let mut r = ToolRegistry::new();
        r.register(Arc::new(Echo));
        r.register(Arc::new(Strict));
        r
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let r = registry();
        let out = r.dispatch("nope", "x").await;
        assert_eq!(out, "Unknown tool: nope");
    }

    #[tokio::test]
    async fn test_dispatch_case_insensitive() {
        let r = registry();
        let out = r.dispatch("ECHO", "hello").await;
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn test_dispatch_arity_one_keeps_pipes() {
        let r = registry();
        let out = r.dispatch("echo", "a|b|c").await;
        assert_eq!(out, "a|b|c");
    }

    #[tokio::test]
    async fn test_dispatch_arity_mismatch_is_textual() {
        let r = registry();
        let out = r.dispatch("strict", "only_one").await;
        assert!(out.starts_with("Error:"), "got: {}", out);
    }

    #[tokio::test]
    async fn test_catalog_lists_tools() {
        let r = registry();
        let catalog = r.catalog();
        assert!(catalog.contains("<tool>"));
        assert!(catalog.contains("- echo(text): Echo the argument back"));
        assert!(catalog.contains("- strict(a, b)"));
    }
}
