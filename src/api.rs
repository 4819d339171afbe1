use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::analyzer::AnalysisResult;
use crate::engine::ConversationEngine;
use crate::intent::Intent;
use crate::session::{SessionStats, Turn};

/// Session used when the client does not send one (single-user mobile app).
pub const DEFAULT_SESSION_ID: &str = "default";

#[derive(Clone)]
pub struct AppState {
    engine: Arc<ConversationEngine>,
}

impl AppState {
    pub fn new(engine: Arc<ConversationEngine>) -> Self {
        Self { engine }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/chat", post(chat))
        .route("/analyze", post(analyze))
        .route("/crisis-check", post(crisis_check))
        .route("/debug/history", get(debug_history))
        .route("/debug/stats", get(debug_stats))
        .route("/admin/clear-session", get(admin_clear_session))
        .route("/admin/evict-idle", get(admin_evict_idle))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Router over a default-configured engine.
pub fn create_router() -> Router {
    router(AppState::new(Arc::new(ConversationEngine::with_defaults())))
}

#[derive(serde::Deserialize)]
struct ChatReq {
    #[serde(default)]
    session_id: Option<String>,
    message: String,
}

#[derive(serde::Serialize)]
struct ChatResp {
    reply: String,
    crisis: bool,
    intent: Intent,
}

#[derive(serde::Deserialize)]
struct TextReq {
    text: String,
}

#[derive(serde::Serialize)]
struct CrisisResp {
    crisis: bool,
}

async fn chat(State(state): State<AppState>, Json(body): Json<ChatReq>) -> Json<ChatResp> {
    let session_id = body
        .session_id
        .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string());
    let reply = state.engine.respond(&session_id, &body.message);
    Json(ChatResp {
        crisis: reply.intent == Intent::Emergency,
        intent: reply.intent,
        reply: reply.text,
    })
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<TextReq>,
) -> Json<AnalysisResult> {
    Json(state.engine.analyze(&body.text))
}

async fn crisis_check(
    State(state): State<AppState>,
    Json(body): Json<TextReq>,
) -> Json<CrisisResp> {
    Json(CrisisResp {
        crisis: state.engine.is_crisis(&body.text),
    })
}

async fn debug_history(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Vec<Turn>> {
    let session_id = q
        .get("session_id")
        .cloned()
        .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string());
    let n = q.get("n").and_then(|v| v.parse::<usize>().ok()).unwrap_or(10);
    Json(state.engine.history(&session_id, n))
}

async fn debug_stats(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<SessionStats> {
    let session_id = q
        .get("session_id")
        .cloned()
        .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string());
    Json(state.engine.stats(&session_id))
}

async fn admin_clear_session(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> String {
    let session_id = q
        .get("session_id")
        .cloned()
        .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string());
    state.engine.clear_session(&session_id);
    format!("cleared session '{}'", session_id)
}

async fn admin_evict_idle(
    State(state): State<AppState>,
    Query(q): Query<HashMap<String, String>>,
) -> String {
    let minutes = q
        .get("minutes")
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(60);
    let evicted = state.engine.evict_idle(chrono::Duration::minutes(minutes));
    format!("evicted {} idle sessions (idle > {}m)", evicted, minutes)
}
