// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /chat (reply shape, crisis flag, default session)
// - POST /analyze
// - POST /crisis-check
// - GET /debug/history, GET /debug/stats
// - GET /admin/clear-session, GET /admin/evict-idle

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use mindcare_triage_engine::api;
use mindcare_triage_engine::lexicon::Lexicon;

const BODY_LIMIT: usize = 1 * 1024 * 1024; // 1MB, safe for tests

/// Build the same Router the binary uses (minus /metrics).
fn test_router() -> Router {
    api::create_router()
}

async fn get_bytes(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET request");
    let resp = app.clone().oneshot(req).await.expect("oneshot GET");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

async fn post_json(app: &Router, uri: &str, payload: Json) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST request");
    let resp = app.clone().oneshot(req).await.expect("oneshot POST");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    (status, bytes)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();
    let (status, bytes) = get_bytes(&app, "/health").await;
    assert_eq!(status, StatusCode::OK, "health should be 200");
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "OK", "health body should be 'OK'");
}

#[tokio::test]
async fn api_chat_returns_reply_crisis_flag_and_intent() {
    let app = test_router();
    let (status, bytes) = post_json(
        &app,
        "/chat",
        json!({ "session_id": "t1", "message": "hello" }),
    )
    .await;
    assert!(status.is_success(), "POST /chat should be 2xx, got {}", status);

    let v: Json = serde_json::from_slice(&bytes).expect("parse chat json");
    assert_eq!(v["crisis"], json!(false));
    assert_eq!(v["intent"], json!("greeting"));

    let reply = v["reply"].as_str().expect("reply string");
    let lexicon = Lexicon::builtin();
    let pool = &lexicon.data().templates.greeting;
    assert!(
        pool.iter().any(|t| t == reply),
        "reply must come from the greeting pool, got: {reply}"
    );
}

#[tokio::test]
async fn api_chat_crisis_sets_flag_and_hotlines() {
    let app = test_router();
    let (status, bytes) = post_json(
        &app,
        "/chat",
        json!({ "session_id": "t2", "message": "I want to end it all" }),
    )
    .await;
    assert!(status.is_success());

    let v: Json = serde_json::from_slice(&bytes).expect("parse chat json");
    assert_eq!(v["crisis"], json!(true));
    assert_eq!(v["intent"], json!("emergency"));
    let reply = v["reply"].as_str().expect("reply string");
    assert!(reply.contains("988"), "crisis reply must carry the lifeline");
    assert!(reply.contains("741741"), "crisis reply must carry the text line");
}

#[tokio::test]
async fn api_chat_defaults_the_session() {
    let app = test_router();
    let (status, _) = post_json(&app, "/chat", json!({ "message": "hello" })).await;
    assert!(status.is_success());

    let (status, bytes) = get_bytes(&app, "/debug/history?n=10").await;
    assert!(status.is_success());
    let v: Json = serde_json::from_slice(&bytes).expect("parse history json");
    let turns = v.as_array().expect("history array");
    assert_eq!(turns.len(), 2, "one user turn plus one assistant turn");
    assert_eq!(turns[0]["role"], json!("user"));
    assert_eq!(turns[0]["text"], json!("hello"));
    assert_eq!(turns[1]["role"], json!("assistant"));
}

#[tokio::test]
async fn api_analyze_returns_expected_json_fields() {
    let app = test_router();
    let (status, bytes) = post_json(
        &app,
        "/analyze",
        json!({ "text": "I'm really stressed and can't handle this!!" }),
    )
    .await;
    assert!(status.is_success());

    let v: Json = serde_json::from_slice(&bytes).expect("parse analyze json");
    assert_eq!(v["emotions"], json!(["anxious"]));
    assert_eq!(v["urgency"], json!(9));
    assert_eq!(v["word_count"], json!(7));
    assert_eq!(v["has_question"], json!(false));
    assert_eq!(v["is_positive"], json!(false));
    assert_eq!(v["is_negative"], json!(true));
    assert!(v.get("themes").is_some(), "missing 'themes'");
}

#[tokio::test]
async fn api_crisis_check_flags_both_ways() {
    let app = test_router();

    let (_, bytes) = post_json(&app, "/crisis-check", json!({ "text": "I can't go on" })).await;
    let v: Json = serde_json::from_slice(&bytes).expect("parse json");
    assert_eq!(v["crisis"], json!(true));

    let (_, bytes) = post_json(&app, "/crisis-check", json!({ "text": "all good here" })).await;
    let v: Json = serde_json::from_slice(&bytes).expect("parse json");
    assert_eq!(v["crisis"], json!(false));
}

#[tokio::test]
async fn api_debug_stats_track_turn_counts() {
    let app = test_router();
    post_json(
        &app,
        "/chat",
        json!({ "session_id": "dbg", "message": "I feel sad" }),
    )
    .await;

    let (status, bytes) = get_bytes(&app, "/debug/stats?session_id=dbg").await;
    assert!(status.is_success());
    let v: Json = serde_json::from_slice(&bytes).expect("parse stats json");
    assert_eq!(v["total_messages"], json!(2));
    assert_eq!(v["user_messages"], json!(1));
    assert_eq!(v["assistant_messages"], json!(1));
    assert_eq!(v["user_turns"], json!(1));
}

#[tokio::test]
async fn api_admin_clear_session_forgets_history() {
    let app = test_router();
    post_json(
        &app,
        "/chat",
        json!({ "session_id": "gone", "message": "hello" }),
    )
    .await;

    let (status, bytes) = get_bytes(&app, "/admin/clear-session?session_id=gone").await;
    assert!(status.is_success());
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body, "cleared session 'gone'");

    let (_, bytes) = get_bytes(&app, "/debug/stats?session_id=gone").await;
    let v: Json = serde_json::from_slice(&bytes).expect("parse stats json");
    assert_eq!(v["total_messages"], json!(0));
}

#[tokio::test]
async fn api_admin_evict_idle_reports_count() {
    let app = test_router();
    post_json(
        &app,
        "/chat",
        json!({ "session_id": "fresh", "message": "hello" }),
    )
    .await;

    let (status, bytes) = get_bytes(&app, "/admin/evict-idle?minutes=60").await;
    assert!(status.is_success());
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body, "evicted 0 idle sessions (idle > 60m)");
}

#[tokio::test]
async fn api_chat_rejects_malformed_body() {
    let app = test_router();
    let (status, _) = post_json(&app, "/chat", json!({ "session_id": "x" })).await;
    assert!(
        status.is_client_error(),
        "missing 'message' should be a 4xx, got {}",
        status
    );
}
