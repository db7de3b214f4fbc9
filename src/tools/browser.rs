//! Browser control tools.
//!
//! Torii drives an already-running Chrome/Chromium started with
//! `--remote-debugging-port`. Tab management goes through the DevTools
//! HTTP endpoints; page commands (navigation, JavaScript evaluation,
//! screenshots) go over the per-target websocket. A browser that is not
//! reachable degrades into a textual tool error, never a fault.

use super::{Tool, ToolError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;

/// One debuggable target reported by the DevTools HTTP endpoint.
#[derive(Debug, Deserialize)]
struct TargetInfo {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    url: String,
    #[serde(rename = "webSocketDebuggerUrl")]
    ws_url: Option<String>,
}

/// Connection to a local Chrome DevTools endpoint.
pub struct DevtoolsSession {
    port: u16,
    http: reqwest::Client,
}

impl DevtoolsSession {
    pub fn new(port: u16) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self { port, http }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    fn unreachable(&self, e: impl std::fmt::Display) -> ToolError {
        ToolError::failed(format!(
            "Browser not reachable on port {}: {}. Start Chrome with --remote-debugging-port={}",
            self.port, e, self.port
        ))
    }

    /// List open page targets.
    async fn pages(&self) -> Result<Vec<TargetInfo>, ToolError> {
        let targets: Vec<TargetInfo> = self
            .http
            .get(self.endpoint("/json/list"))
            .send()
            .await
            .map_err(|e| self.unreachable(e))?
            .json()
            .await
            .map_err(|e| self.unreachable(e))?;

        Ok(targets.into_iter().filter(|t| t.kind == "page").collect())
    }

    /// The most recently listed page target.
    async fn active_page(&self) -> Result<TargetInfo, ToolError> {
        self.pages()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ToolError::failed("No open browser tab"))
    }

    /// Open a new tab at the given URL.
    async fn open_tab(&self, url: &str) -> Result<TargetInfo, ToolError> {
        // Newer Chrome versions require PUT for /json/new.
        self.http
            .put(self.endpoint(&format!("/json/new?{}", url)))
            .send()
            .await
            .map_err(|e| self.unreachable(e))?
            .json()
            .await
            .map_err(|e| ToolError::failed(format!("Unexpected DevTools response: {}", e)))
    }

    /// Close a tab by target id.
    async fn close_tab(&self, id: &str) -> Result<(), ToolError> {
        self.http
            .get(self.endpoint(&format!("/json/close/{}", id)))
            .send()
            .await
            .map_err(|e| self.unreachable(e))?;
        Ok(())
    }

    /// Send one CDP command to the active page and return its result.
    async fn command(&self, method: &str, params: Value) -> Result<Value, ToolError> {
        let page = self.active_page().await?;
        let ws_url = page
            .ws_url
            .ok_or_else(|| ToolError::failed("Browser tab has no debugger endpoint"))?;

        debug!("CDP {} on {}", method, page.url);

        let (mut ws, _) = connect_async(&ws_url)
            .await
            .map_err(|e| self.unreachable(e))?;

        let request = json!({ "id": 1, "method": method, "params": params });
        ws.send(Message::Text(request.to_string()))
            .await
            .map_err(|e| ToolError::failed(format!("DevTools send failed: {}", e)))?;

        // Events may arrive before the command response; skip until the
        // reply with our id shows up.
        let reply = loop {
            let frame = tokio::time::timeout(Duration::from_secs(15), ws.next())
                .await
                .map_err(|_| ToolError::failed("DevTools command timed out"))?
                .ok_or_else(|| ToolError::failed("DevTools connection closed"))?
                .map_err(|e| ToolError::failed(format!("DevTools receive failed: {}", e)))?;

            if let Message::Text(text) = frame {
                let value: Value = serde_json::from_str(&text)
                    .map_err(|e| ToolError::failed(format!("Bad DevTools frame: {}", e)))?;
                if value.get("id").and_then(Value::as_i64) == Some(1) {
                    break value;
                }
            }
        };

        let _ = ws.close(None).await;

        if let Some(error) = reply.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown DevTools error");
            return Err(ToolError::failed(format!("Browser error: {}", message)));
        }

        Ok(reply.get("result").cloned().unwrap_or(Value::Null))
    }

    /// Evaluate a JavaScript expression in the active page.
    async fn evaluate(&self, expression: &str) -> Result<String, ToolError> {
        let result = self
            .command(
                "Runtime.evaluate",
                json!({ "expression": expression, "returnByValue": true }),
            )
            .await?;

        if let Some(desc) = result
            .get("exceptionDetails")
            .and_then(|d| d.get("exception"))
            .and_then(|e| e.get("description"))
            .and_then(Value::as_str)
        {
            return Err(ToolError::failed(format!("Page script failed: {}", desc)));
        }

        let value = result
            .get("result")
            .and_then(|r| r.get("value"))
            .cloned()
            .unwrap_or(Value::Null);

        Ok(match value {
            Value::String(s) => s,
            Value::Null => "Success".to_string(),
            other => other.to_string(),
        })
    }
}

/// Ensure a URL has a scheme, defaulting to https.
fn with_scheme(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Build a click expression for a CSS selector.
fn click_script(selector: &str) -> String {
    let sel = serde_json::to_string(selector).unwrap_or_default();
    format!(
        r#"(() => {{
  const el = document.querySelector({sel});
  if (!el) return "No element matches selector: " + {sel};
  el.click();
  return "Clicked: " + {sel};
}})()"#
    )
}

/// Build a fill expression for a CSS selector and text.
fn type_script(selector: &str, text: &str) -> String {
    let sel = serde_json::to_string(selector).unwrap_or_default();
    let val = serde_json::to_string(text).unwrap_or_default();
    format!(
        r#"(() => {{
  const el = document.querySelector({sel});
  if (!el) return "No element matches selector: " + {sel};
  el.focus();
  el.value = {val};
  el.dispatchEvent(new Event('input', {{ bubbles: true }}));
  return "Typed into: " + {sel};
}})()"#
    )
}

const BODY_TEXT_SCRIPT: &str = "document.body.innerText.slice(0, 2000)";

/// Open a URL in a new browser tab.
pub struct BrowserOpen {
    session: std::sync::Arc<DevtoolsSession>,
}

impl BrowserOpen {
    pub fn new(session: std::sync::Arc<DevtoolsSession>) -> Self {
        Self { session }
    }
}

#[async_trait::async_trait]
impl Tool for BrowserOpen {
    fn name(&self) -> &str {
        "browser_open"
    }

    fn description(&self) -> &str {
        "Open a URL in the browser"
    }

    fn params(&self) -> &[&str] {
        &["url"]
    }

    async fn invoke(&self, args: &[String]) -> Result<String, ToolError> {
        let raw = args.first().ok_or(ToolError::Arity {
            expected: 1,
            got: 0,
        })?;
        let url = with_scheme(raw);
        self.session.open_tab(&url).await?;
        Ok(format!("Opened {} in the browser", url))
    }
}

/// Click an element in the active tab.
pub struct BrowserClick {
    session: std::sync::Arc<DevtoolsSession>,
}

impl BrowserClick {
    pub fn new(session: std::sync::Arc<DevtoolsSession>) -> Self {
        Self { session }
    }
}

#[async_trait::async_trait]
impl Tool for BrowserClick {
    fn name(&self) -> &str {
        "browser_click"
    }

    fn description(&self) -> &str {
        "Click an element by CSS selector, e.g. #submit_btn or [aria-label=\"Search\"]"
    }

    fn params(&self) -> &[&str] {
        &["selector"]
    }

    async fn invoke(&self, args: &[String]) -> Result<String, ToolError> {
        let selector = args.first().ok_or(ToolError::Arity {
            expected: 1,
            got: 0,
        })?;
        self.session.evaluate(&click_script(selector)).await
    }
}

/// Type text into an element in the active tab.
pub struct BrowserType {
    session: std::sync::Arc<DevtoolsSession>,
}

impl BrowserType {
    pub fn new(session: std::sync::Arc<DevtoolsSession>) -> Self {
        Self { session }
    }
}

#[async_trait::async_trait]
impl Tool for BrowserType {
    fn name(&self) -> &str {
        "browser_type"
    }

    fn description(&self) -> &str {
        "Type text into an element by CSS selector, e.g. [name=\"q\"]"
    }

    fn params(&self) -> &[&str] {
        &["selector", "text"]
    }

    async fn invoke(&self, args: &[String]) -> Result<String, ToolError> {
        if args.len() < 2 {
            return Err(ToolError::Arity {
                expected: 2,
                got: args.len(),
            });
        }
        self.session
            .evaluate(&type_script(&args[0], &args[1]))
            .await
    }
}

/// Read the visible text of the active tab.
pub struct BrowserText {
    session: std::sync::Arc<DevtoolsSession>,
}

impl BrowserText {
    pub fn new(session: std::sync::Arc<DevtoolsSession>) -> Self {
        Self { session }
    }
}

#[async_trait::async_trait]
impl Tool for BrowserText {
    fn name(&self) -> &str {
        "browser_text"
    }

    fn description(&self) -> &str {
        "Get the visible text of the current page"
    }

    fn params(&self) -> &[&str] {
        &[]
    }

    async fn invoke(&self, _args: &[String]) -> Result<String, ToolError> {
        self.session.evaluate(BODY_TEXT_SCRIPT).await
    }
}

/// Capture a screenshot of the active tab.
pub struct BrowserScreenshot {
    session: std::sync::Arc<DevtoolsSession>,
    output_dir: PathBuf,
}

impl BrowserScreenshot {
    pub fn new(session: std::sync::Arc<DevtoolsSession>, output_dir: &Path) -> Self {
        Self {
            session,
            output_dir: output_dir.to_path_buf(),
        }
    }
}

#[async_trait::async_trait]
impl Tool for BrowserScreenshot {
    fn name(&self) -> &str {
        "browser_screenshot"
    }

    fn description(&self) -> &str {
        "Save a screenshot of the current page"
    }

    fn params(&self) -> &[&str] {
        &["filename"]
    }

    async fn invoke(&self, args: &[String]) -> Result<String, ToolError> {
        let filename = args
            .first()
            .map(String::as_str)
            .unwrap_or("screenshot.png");

        let result = self
            .session
            .command("Page.captureScreenshot", json!({ "format": "png" }))
            .await?;

        let data = result
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::failed("Browser returned no screenshot data"))?;

        let bytes = BASE64
            .decode(data)
            .map_err(|e| ToolError::failed(format!("Bad screenshot data: {}", e)))?;

        let path = self.output_dir.join(filename);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ToolError::failed(format!("Error saving screenshot: {}", e)))?;

        Ok(format!("Screenshot saved: {}", path.display()))
    }
}

/// Close the active browser tab.
pub struct BrowserClose {
    session: std::sync::Arc<DevtoolsSession>,
}

impl BrowserClose {
    pub fn new(session: std::sync::Arc<DevtoolsSession>) -> Self {
        Self { session }
    }
}

#[async_trait::async_trait]
impl Tool for BrowserClose {
    fn name(&self) -> &str {
        "browser_close"
    }

    fn description(&self) -> &str {
        "Close the current browser tab"
    }

    fn params(&self) -> &[&str] {
        &[]
    }

    async fn invoke(&self, _args: &[String]) -> Result<String, ToolError> {
        let page = self.session.active_page().await?;
        self.session.close_tab(&page.id).await?;
        Ok("Browser tab closed".to_string())
    }
}
