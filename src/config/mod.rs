//! Configuration module for Torii.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    GeneralSettings, LlmSettings, MemorySettings, Settings, TelegramSettings, ToolSettings,
};
