//! Error types for Torii.

use thiserror::Error;

/// Library-level error type for Torii operations.
#[derive(Error, Debug)]
pub enum ToriiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Memory store error: {0}")]
    Memory(String),

    #[error("Completion provider error: {0}")]
    Provider(String),

    #[error("Telegram error: {0}")]
    Telegram(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for Torii operations.
pub type Result<T> = std::result::Result<T, ToriiError>;
