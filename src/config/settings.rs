//! Configuration settings for Torii.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub llm: LlmSettings,
    pub memory: MemorySettings,
    pub tools: ToolSettings,
    pub telegram: TelegramSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.torii".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Completion model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Chat model to use.
    pub model: String,
    /// Base URL for an OpenAI-compatible endpoint. None = api.openai.com.
    pub base_url: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens per completion.
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            temperature: 0.7,
            max_tokens: 1024,
            timeout_seconds: 120,
        }
    }
}

/// Conversation memory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    /// Path to the SQLite conversation database.
    pub sqlite_path: String,
    /// Number of recent turns included in each prompt.
    pub history_window: usize,
}

impl Default for MemorySettings {
    fn default() -> Self {
        Self {
            sqlite_path: "~/.torii/conversations.db".to_string(),
            history_window: 10,
        }
    }
}

/// Tool execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Root directory for file tools. File paths resolve relative to it.
    pub workspace_dir: String,
    /// Python interpreter used by the run_python tool.
    pub python_bin: String,
    /// Timeout for code execution in seconds.
    pub code_timeout_seconds: u64,
    /// Chrome DevTools debugging port for the browser tools.
    pub devtools_port: u16,
    /// Serper API key for web search. Falls back to SERPER_API_KEY.
    pub serper_api_key: Option<String>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            workspace_dir: "~".to_string(),
            python_bin: "python3".to_string(),
            code_timeout_seconds: 30,
            devtools_port: 9222,
            serper_api_key: None,
        }
    }
}

/// Telegram bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct TelegramSettings {
    /// Bot API token. Falls back to TELEGRAM_BOT_TOKEN.
    pub token: Option<String>,
}


impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ToriiError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("torii")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded SQLite database path.
    pub fn sqlite_path(&self) -> PathBuf {
        Self::expand_path(&self.memory.sqlite_path)
    }

    /// Get the expanded tool workspace directory.
    pub fn workspace_dir(&self) -> PathBuf {
        Self::expand_path(&self.tools.workspace_dir)
    }

    /// Resolve the Serper API key from config or environment.
    pub fn serper_api_key(&self) -> Option<String> {
        self.tools
            .serper_api_key
            .clone()
            .or_else(|| std::env::var("SERPER_API_KEY").ok())
            .filter(|k| !k.is_empty())
    }

    /// Resolve the Telegram bot token from config or environment.
    pub fn telegram_token(&self) -> Option<String> {
        self.telegram
            .token
            .clone()
            .or_else(|| std::env::var("TELEGRAM_BOT_TOKEN").ok())
            .filter(|t| !t.is_empty())
    }
}
