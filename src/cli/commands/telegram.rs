//! Telegram bot frontend.
//!
//! Long-polls the Bot API over HTTPS. Each chat maps to its own
//! conversation ("tg-{chat_id}"), so parallel chats never share history.

use crate::cli::Output;
use crate::config::Settings;
use crate::memory::ConversationId;
use crate::runtime::Runtime;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Seconds the getUpdates call blocks server-side before returning empty.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Telegram caps message length at 4096 characters.
const MAX_MESSAGE_LEN: usize = 4096;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct BotUser {
    username: Option<String>,
}

struct BotApi {
    http: reqwest::Client,
    base: String,
}

impl BotApi {
    fn new(token: &str) -> crate::error::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 15))
            .build()?;
        Ok(Self {
            http,
            base: format!("https://api.telegram.org/bot{}", token),
        })
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> crate::error::Result<T> {
        let response = self
            .http
            .post(format!("{}/{}", self.base, method))
            .json(&params)
            .send()
            .await?;

        let body: ApiResponse<T> = response.json().await?;
        if !body.ok {
            return Err(crate::error::ToriiError::Telegram(
                body.description
                    .unwrap_or_else(|| format!("{} failed", method)),
            ));
        }
        body.result
            .ok_or_else(|| crate::error::ToriiError::Telegram(format!("{}: empty result", method)))
    }

    async fn get_me(&self) -> crate::error::Result<BotUser> {
        self.call("getMe", serde_json::json!({})).await
    }

    async fn get_updates(&self, offset: i64) -> crate::error::Result<Vec<Update>> {
        self.call(
            "getUpdates",
            serde_json::json!({
                "offset": offset,
                "timeout": POLL_TIMEOUT_SECS,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }

    async fn send_typing(&self, chat_id: i64) {
        let result: crate::error::Result<bool> = self
            .call(
                "sendChatAction",
                serde_json::json!({ "chat_id": chat_id, "action": "typing" }),
            )
            .await;
        if let Err(e) = result {
            debug!("sendChatAction failed: {}", e);
        }
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> crate::error::Result<()> {
        for chunk in split_message(text) {
            let _: Message = self
                .call(
                    "sendMessage",
                    serde_json::json!({ "chat_id": chat_id, "text": chunk }),
                )
                .await?;
        }
        Ok(())
    }
}

/// Split a reply into chunks that fit Telegram's message limit,
/// preferring line boundaries.
fn split_message(text: &str) -> Vec<String> {
    if text.chars().count() <= MAX_MESSAGE_LEN {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.split_inclusive('\n') {
        if current.chars().count() + line.chars().count() > MAX_MESSAGE_LEN {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            // A single oversized line gets hard-split.
            let mut rest: Vec<char> = line.chars().collect();
            while rest.len() > MAX_MESSAGE_LEN {
                chunks.push(rest[..MAX_MESSAGE_LEN].iter().collect());
                rest.drain(..MAX_MESSAGE_LEN);
            }
            current = rest.into_iter().collect();
        } else {
            current.push_str(line);
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Run the Telegram bot until interrupted.
pub async fn run_telegram(settings: Settings) -> anyhow::Result<()> {
    let token = settings.telegram_token().ok_or_else(|| {
        anyhow::anyhow!(
            "No Telegram token configured. Set TELEGRAM_BOT_TOKEN or add it to the config file."
        )
    })?;

    let runtime = Arc::new(Runtime::new(settings)?);
    let api = Arc::new(BotApi::new(&token)?);

    let me = api.get_me().await?;
    let username = me.username.unwrap_or_else(|| "unknown".to_string());

    Output::header("Torii Telegram Bot");
    println!();
    Output::success(&format!("Connected as @{}", username));
    Output::info("Press Ctrl+C to stop the bot.");
    info!("telegram bot started as @{}", username);

    let mut offset = 0i64;
    loop {
        let updates = match api.get_updates(offset).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!("getUpdates failed: {}; retrying", e);
                tokio::time::sleep(Duration::from_secs(3)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);

            let Some(message) = update.message else { continue };
            let Some(text) = message.text else { continue };
            let chat_id = message.chat.id;

            let api = Arc::clone(&api);
            let runtime = Arc::clone(&runtime);
            tokio::spawn(async move {
                if let Err(e) = handle_message(&api, &runtime, chat_id, &text).await {
                    error!("failed to handle message from chat {}: {}", chat_id, e);
                }
            });
        }
    }
}

async fn handle_message(
    api: &BotApi,
    runtime: &Runtime,
    chat_id: i64,
    text: &str,
) -> crate::error::Result<()> {
    let conversation = ConversationId::new(format!("tg-{}", chat_id));

    if text.trim() == "/start" {
        api.send_message(
            chat_id,
            "Hi! I'm Torii, your personal assistant. I can work with files, \
             search the web, run code, and browse pages. Send /clear to reset \
             our conversation.",
        )
        .await?;
        return Ok(());
    }

    if text.trim() == "/clear" {
        let status = runtime.store().clear(&conversation).await;
        api.send_message(chat_id, &status).await?;
        return Ok(());
    }

    api.send_typing(chat_id).await;

    let agent = runtime.agent_for(conversation);
    let reply = agent.handle(text).await;
    api.send_message(chat_id, &reply).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_short_message() {
        let chunks = split_message("hello");
        assert_eq!(chunks, vec!["hello".to_string()]);
    }

    #[test]
    fn test_split_long_message_at_lines() {
        let line = "x".repeat(3000);
        let text = format!("{}\n{}\n", line, line);
        let chunks = split_message(&text);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.chars().count() <= MAX_MESSAGE_LEN));
    }

    #[test]
    fn test_split_oversized_single_line() {
        let text = "y".repeat(MAX_MESSAGE_LEN * 2 + 10);
        let chunks = split_message(&text);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), MAX_MESSAGE_LEN);
        assert_eq!(chunks[1].len(), MAX_MESSAGE_LEN);
        assert_eq!(chunks[2].len(), 10);
    }

    #[test]
    fn test_update_deserialization() {
        let raw = r#"{
            "ok": true,
            "result": [
                {"update_id": 7, "message": {"chat": {"id": 42}, "text": "hi"}}
            ]
        }"#;
        let parsed: ApiResponse<Vec<Update>> = serde_json::from_str(raw).unwrap();
        assert!(parsed.ok);
        let updates = parsed.result.unwrap();
        assert_eq!(updates[0].update_id, 7);
        assert_eq!(updates[0].message.as_ref().unwrap().chat.id, 42);
    }
}
