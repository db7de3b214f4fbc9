//! HTTP API server for integration with other systems.
//!
//! The surface is exactly the agent's inbound contract: send one message,
//! get one reply; clear a conversation. Both handlers are total, so every
//! response is a 200 with a textual payload.

use crate::cli::Output;
use crate::config::Settings;
use crate::memory::ConversationId;
use crate::runtime::Runtime;
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let runtime = Arc::new(Runtime::new(settings)?);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/reset", post(reset))
        .layer(cors)
        .with_state(runtime);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Torii API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Chat", "POST /chat");
    Output::kv("Reset", "POST /reset");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    /// Conversation to continue; the default CLI conversation if absent.
    #[serde(default)]
    conversation: Option<String>,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
}

#[derive(Deserialize, Default)]
struct ResetRequest {
    #[serde(default)]
    conversation: Option<String>,
}

#[derive(Serialize)]
struct ResetResponse {
    status: String,
}

fn conversation_id(raw: Option<String>) -> ConversationId {
    raw.map(ConversationId::new).unwrap_or_default()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn chat(
    State(runtime): State<Arc<Runtime>>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    let agent = runtime.agent_for(conversation_id(req.conversation));
    let response = agent.handle(&req.message).await;
    Json(ChatResponse { response })
}

async fn reset(
    State(runtime): State<Arc<Runtime>>,
    Json(req): Json<ResetRequest>,
) -> impl IntoResponse {
    let conversation = conversation_id(req.conversation);
    let status = runtime.store().clear(&conversation).await;
    Json(ResetResponse { status })
}
