//! CLI module for Torii.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Torii - Personal AI Assistant
///
/// A tool-using conversational agent with persistent memory. Torii can
/// work with files, search the web, run code, and drive a browser.
#[derive(Parser, Debug)]
#[command(name = "torii")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session
    Chat {
        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Conversation id to continue
        #[arg(long)]
        conversation: Option<String>,
    },

    /// Send a single message and print the reply
    Ask {
        /// The message to send
        message: String,

        /// LLM model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Conversation id to continue
        #[arg(long)]
        conversation: Option<String>,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Start the Telegram bot
    Telegram,

    /// Clear conversation history
    Reset {
        /// Conversation id to clear
        #[arg(long)]
        conversation: Option<String>,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
