//! Torii - Personal AI Assistant
//!
//! A tool-using conversational agent with persistent memory. Torii wraps an
//! OpenAI-compatible chat model in a loop that lets the model call local
//! tools (files, web search, Python, a Chrome browser) and feeds the results
//! back until it produces a plain-text answer.
//!
//! # Overview
//!
//! Torii allows you to:
//! - Chat with an assistant that remembers past turns per conversation
//! - Let the model work with files, search the web, and run Python
//! - Drive a running Chrome instance over the DevTools protocol
//! - Talk to the same agent from the terminal, HTTP, or Telegram
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `memory` - Conversation persistence (SQLite)
//! - `llm` - Completion provider abstraction
//! - `tools` - Tool trait, registry, and the built-in tool catalog
//! - `agent` - Tool-call parsing, argument resolution, and the agent loop
//! - `runtime` - Wires settings, store, provider, and registry together
//!
//! # Example
//!
//! ```rust,no_run
//! use torii::config::Settings;
//! use torii::runtime::Runtime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let runtime = Runtime::new(settings)?;
//!
//!     let agent = runtime.agent_for(Default::default());
//!     let reply = agent.handle("What files are in my workspace?").await;
//!     println!("{}", reply);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod memory;
pub mod runtime;
pub mod tools;

pub use error::{Result, ToriiError};
