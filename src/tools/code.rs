//! Code execution tool.

use super::{Tool, ToolError};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Run a Python snippet in a subprocess and return its output.
pub struct RunPython {
    python_bin: String,
    timeout: Duration,
}

impl RunPython {
    pub fn new(python_bin: &str, timeout_seconds: u64) -> Self {
        Self {
            python_bin: python_bin.to_string(),
            timeout: Duration::from_secs(timeout_seconds),
        }
    }
}

#[async_trait::async_trait]
impl Tool for RunPython {
    fn name(&self) -> &str {
        "run_python"
    }

    fn description(&self) -> &str {
        "Run Python code and return its output"
    }

    fn params(&self) -> &[&str] {
        &["code"]
    }

    async fn invoke(&self, args: &[String]) -> Result<String, ToolError> {
        let code = args.first().ok_or(ToolError::Arity {
            expected: 1,
            got: 0,
        })?;

        debug!("Running {} byte(s) of Python", code.len());

        let child = Command::new(&self.python_bin)
            .arg("-c")
            .arg(code)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| {
                ToolError::failed(format!(
                    "Code execution timed out after {} seconds",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| ToolError::failed(format!("Error running code: {}", e)))?;

        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout);
            Ok(format!("Output:\n{}", stdout))
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Ok(format!("Error:\n{}", stderr))
        }
    }
}
