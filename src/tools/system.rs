//! System information tool.

use super::{Tool, ToolError};
use chrono::Local;

/// Report basic information about the host system.
pub struct SystemInfo;

#[async_trait::async_trait]
impl Tool for SystemInfo {
    fn name(&self) -> &str {
        "system_info"
    }

    fn description(&self) -> &str {
        "Get the current time, working directory, and platform"
    }

    fn params(&self) -> &[&str] {
        &[]
    }

    async fn invoke(&self, _args: &[String]) -> Result<String, ToolError> {
        let cwd = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        Ok(format!(
            "datetime: {}\ncurrent_directory: {}\nplatform: {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            cwd,
            std::env::consts::OS
        ))
    }
}
