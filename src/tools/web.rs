//! Web search and page fetching tools.

use super::{Tool, ToolError};
use regex::Regex;
use serde_json::{json, Value};
use std::sync::LazyLock;
use std::time::Duration;

const SERPER_URL: &str = "https://google.serper.dev/search";
const USER_AGENT: &str = "Mozilla/5.0 (compatible; torii/0.1)";
const PAGE_TEXT_LIMIT: usize = 2000;

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_default()
}

/// Search the web via the Serper API.
pub struct SearchWeb {
    api_key: Option<String>,
    client: reqwest::Client,
}

impl SearchWeb {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            client: http_client(),
        }
    }
}

#[async_trait::async_trait]
impl Tool for SearchWeb {
    fn name(&self) -> &str {
        "search_web"
    }

    fn description(&self) -> &str {
        "Search the web and return the top results"
    }

    fn params(&self) -> &[&str] {
        &["query"]
    }

    async fn invoke(&self, args: &[String]) -> Result<String, ToolError> {
        let query = args.first().ok_or(ToolError::Arity {
            expected: 1,
            got: 0,
        })?;

        let api_key = self.api_key.as_ref().ok_or_else(|| {
            ToolError::failed("Web search is not configured (set SERPER_API_KEY)")
        })?;

        let response = self
            .client
            .post(SERPER_URL)
            .header("X-API-KEY", api_key)
            .json(&json!({ "q": query, "num": 5 }))
            .send()
            .await
            .map_err(|e| ToolError::failed(format!("Error searching web: {}", e)))?;

        let data: Value = response
            .json()
            .await
            .map_err(|e| ToolError::failed(format!("Error searching web: {}", e)))?;

        Ok(format_search_results(&data, query))
    }
}

/// Format a Serper response into readable result text.
fn format_search_results(data: &Value, query: &str) -> String {
    let mut results = Vec::new();

    if let Some(answer_box) = data.get("answerBox") {
        let answer = answer_box
            .get("answer")
            .or_else(|| answer_box.get("snippet"))
            .and_then(Value::as_str);
        if let Some(answer) = answer {
            results.push(format!("Quick answer: {}", answer));
        }
    }

    if let Some(organic) = data.get("organic").and_then(Value::as_array) {
        for item in organic.iter().take(5) {
            let title = item.get("title").and_then(Value::as_str).unwrap_or("");
            let snippet = item.get("snippet").and_then(Value::as_str).unwrap_or("");
            let link = item.get("link").and_then(Value::as_str).unwrap_or("");
            results.push(format!("- {}\n  {}\n  {}", title, snippet, link));
        }
    }

    if results.is_empty() {
        return format!("No results found for: {}", query);
    }

    format!("Search results:\n\n{}", results.join("\n\n"))
}

/// Fetch a webpage and return its visible text.
pub struct FetchWebpage {
    client: reqwest::Client,
}

impl FetchWebpage {
    pub fn new() -> Self {
        Self {
            client: http_client(),
        }
    }
}

impl Default for FetchWebpage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Tool for FetchWebpage {
    fn name(&self) -> &str {
        "fetch_webpage"
    }

    fn description(&self) -> &str {
        "Fetch and read the text content of a webpage"
    }

    fn params(&self) -> &[&str] {
        &["url"]
    }

    async fn invoke(&self, args: &[String]) -> Result<String, ToolError> {
        let raw_url = args.first().ok_or(ToolError::Arity {
            expected: 1,
            got: 0,
        })?;

        let url = normalize_url(raw_url)
            .map_err(|e| ToolError::failed(format!("Invalid URL {}: {}", raw_url, e)))?;

        let body = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(|e| ToolError::failed(format!("Error fetching webpage: {}", e)))?
            .text()
            .await
            .map_err(|e| ToolError::failed(format!("Error fetching webpage: {}", e)))?;

        Ok(truncate(&html_to_text(&body), PAGE_TEXT_LIMIT))
    }
}

/// Parse a URL, defaulting to https when no scheme was given.
fn normalize_url(raw: &str) -> Result<url::Url, url::ParseError> {
    match url::Url::parse(raw) {
        Ok(u) => Ok(u),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            url::Url::parse(&format!("https://{}", raw))
        }
        Err(e) => Err(e),
    }
}

static SCRIPT_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>").expect("script/style regex")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]+>").expect("tag regex"));

/// Reduce an HTML document to plain text, one line per text run.
fn html_to_text(html: &str) -> String {
    let without_scripts = SCRIPT_STYLE.replace_all(html, " ");
    let without_tags = TAG.replace_all(&without_scripts, "\n");

    let decoded = without_tags
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");

    decoded
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let cut: String = text.chars().take(limit).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_strips_markup() {
        let html = r#"<html><head><style>body { color: red }</style>
            <script>alert("no")</script></head>
            <body><h1>Title</h1><p>Hello &amp; welcome</p></body></html>"#;
        let text = html_to_text(html);
        assert!(text.contains("Title"));
        assert!(text.contains("Hello & welcome"));
        assert!(!text.contains("alert"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_truncate_caps_length() {
        let long = "x".repeat(3000);
        let out = truncate(&long, PAGE_TEXT_LIMIT);
        assert_eq!(out.chars().count(), PAGE_TEXT_LIMIT + 3);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn test_normalize_url_defaults_to_https() {
        assert_eq!(
            normalize_url("example.com/page").unwrap().as_str(),
            "https://example.com/page"
        );
        assert_eq!(
            normalize_url("http://example.com/").unwrap().scheme(),
            "http"
        );
    }

    #[test]
    fn test_format_search_results_with_answer_box() {
        let data = serde_json::json!({
            "answerBox": { "answer": "42" },
            "organic": [
                { "title": "Result", "snippet": "A snippet", "link": "https://a.example" }
            ]
        });
        let out = format_search_results(&data, "meaning of life");
        assert!(out.contains("Quick answer: 42"));
        assert!(out.contains("- Result"));
        assert!(out.contains("https://a.example"));
    }

    #[test]
    fn test_format_search_results_empty() {
        let data = serde_json::json!({});
        let out = format_search_results(&data, "nothing");
        assert_eq!(out, "No results found for: nothing");
    }

    #[tokio::test]
    async fn test_search_without_key_is_textual_error() {
        let tool = SearchWeb::new(None);
        let err = tool.invoke(&["anything".to_string()]).await.unwrap_err();
        assert!(matches!(err, ToolError::Failed(_)));
    }
}
