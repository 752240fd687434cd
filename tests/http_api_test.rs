//! Integration tests for the HTTP API endpoints.
//!
//! Uses axum's oneshot pattern (via tower::ServiceExt), so no TCP binding is needed.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use can_you_pi::{
    AppState, ChatBackend, ChatMessage, ChatStore, DigitSource, PiError, PiService,
    ToolDefinition, create_router,
};

fn app_with(backend: Result<Arc<dyn ChatBackend>, PiError>) -> axum::Router {
    let service = PiService::new(DigitSource::embedded().unwrap());
    create_router(AppState::new(service, ChatStore::new(), backend))
}

fn app() -> axum::Router {
    app_with(Err(PiError::configuration(
        "GROQ_API_KEY environment variable not set",
    )))
}

/// Parse response body as JSON.
async fn body_json(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::delete(uri).body(Body::empty()).unwrap()
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    (status, body_json(resp.into_body()).await)
}

async fn start_game(app: &axum::Router) -> String {
    let (status, json) = send(app, post("/start", json!({ "mode": "standard" }))).await;
    assert_eq!(status, StatusCode::OK);
    json["game_id"].as_str().unwrap().to_string()
}

// ── GET / and /health ────────────────────────────────────────────────

#[tokio::test]
async fn root_and_health() {
    let app = app();
    let (status, json) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Welcome to the Can You Pi?");

    let (status, json) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "OK");
}

// ── Games ────────────────────────────────────────────────────────────

#[tokio::test]
async fn start_defaults_to_standard() {
    let app = app();
    let (status, json) = send(&app, post("/start", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["mode"], "standard");
    assert_eq!(json["current_position"], 1);
    assert_eq!(json["total_digits_available"], 10_000);
}

#[tokio::test]
async fn start_custom_out_of_range_is_400() {
    let app = app();
    let (status, json) = send(
        &app,
        post("/start", json!({ "mode": "custom", "start_position": 20000 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "OUT_OF_RANGE");
}

#[tokio::test]
async fn play_turns() {
    let app = app();
    let id = start_game(&app).await;

    let (status, json) = send(&app, post(&format!("/game/{id}/play"), json!({ "input": "1" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["correct"], true);
    assert_eq!(json["current_index"], 1);

    let (status, json) = send(&app, post(&format!("/game/{id}/play"), json!({ "input": "ab" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_INPUT");

    let (_, json) = send(&app, post(&format!("/game/{id}/play"), json!({ "input": "5" }))).await;
    assert_eq!(json["correct"], false);
    assert_eq!(json["expected_digit"], "4");
    assert_eq!(json["game_over"], true);

    let (status, json) = send(&app, post(&format!("/game/{id}/play"), json!({ "input": "4" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "ALREADY_TERMINAL");
}

#[tokio::test]
async fn malformed_bodies_are_json_errors() {
    let app = app();
    let id = start_game(&app).await;

    let (status, json) = send(&app, post(&format!("/game/{id}/play"), json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_INPUT");
    assert!(json["error"].as_str().unwrap().contains("missing field `input`"));

    let request = Request::post(format!("/game/{id}/verify"))
        .body(Body::from(r#"{"sequence":"3.14"}"#))
        .unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_INPUT");

    let request = Request::post("/start")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_INPUT");

    // The game is untouched by the rejected requests.
    let (_, json) = send(&app, get(&format!("/game/{id}/status"))).await;
    assert_eq!(json["score"], 0);
}

#[tokio::test]
async fn verify_and_status() {
    let app = app();
    let id = start_game(&app).await;

    let (status, json) = send(
        &app,
        post(&format!("/game/{id}/verify"), json!({ "sequence": "3.14159" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["all_correct"], true);
    assert_eq!(json["current_score"], 5);
    assert_eq!(json["sequence_provided"], "3.14159");

    let (status, json) = send(&app, get(&format!("/game/{id}/status"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["score"], 5);
    assert_eq!(json["current_position"], 6);
    assert_eq!(json["sequence_so_far"], "3.14159");
    assert_eq!(json["next_10_digits"], "2653589793");

    let (_, json) = send(
        &app,
        post(&format!("/game/{id}/verify"), json!({ "sequence": "0" })),
    )
    .await;
    assert_eq!(json["wrong_at_position"], 6);
    assert_eq!(json["expected_digit"], "2");
    assert_eq!(json["got_digit"], "0");
    assert_eq!(json["final_score"], 5);
}

#[tokio::test]
async fn verify_empty_sequence_is_400() {
    let app = app();
    let id = start_game(&app).await;
    let (status, json) = send(
        &app,
        post(&format!("/game/{id}/verify"), json!({ "sequence": "3." })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "No digits provided");
}

#[tokio::test]
async fn hint_uses_query_count() {
    let app = app();
    let id = start_game(&app).await;

    let (status, json) = send(&app, get(&format!("/game/{id}/hint?count=4"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hint"], "1415");
    assert_eq!(json["start_position"], 1);

    let (_, json) = send(&app, get(&format!("/game/{id}/hint"))).await;
    assert_eq!(json["hint"], "1");

    let (status, _) = send(&app, get(&format!("/game/{id}/hint?count=0"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, json) = send(&app, get(&format!("/game/{id}/hint?count=-1"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "INVALID_INPUT");
    assert!(json["error"].as_str().unwrap().contains("count"));
}

#[tokio::test]
async fn delete_ends_game() {
    let app = app();
    let id = start_game(&app).await;

    let (status, json) = send(&app, delete(&format!("/game/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["final_score"], 0);

    let (status, json) = send(&app, get(&format!("/game/{id}/status"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Game not found");
    assert_eq!(json["code"], "NOT_FOUND");
}

// ── Quizzes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn quiz_start_and_check() {
    let app = app();
    let (status, json) = send(&app, post("/quiz/start", json!({ "position": 1 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "What is the 1st decimal of Pi?");
    let quiz_id = json["quiz_id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        post(&format!("/quiz/{quiz_id}/check"), json!({ "guess": "1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["correct"], true);

    let (status, _) = send(
        &app,
        post(&format!("/quiz/{quiz_id}/check"), json!({ "input": "1" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn quiz_random_position() {
    let app = app();
    let (status, json) = send(&app, post("/quiz/start", json!({ "max_position": 3 }))).await;
    assert_eq!(status, StatusCode::OK);
    let position = json["position"].as_u64().unwrap();
    assert!((1..=3).contains(&position));
}

// ── Chat ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_without_credentials_is_503() {
    let app = app();
    let (status, json) = send(&app, post("/chat", json!({ "message": "start" }))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "CONFIGURATION");
    assert_eq!(json["error"], "GROQ_API_KEY environment variable not set");

    // Games still work without an LLM.
    start_game(&app).await;
}

struct EchoBackend;

#[async_trait]
impl ChatBackend for EchoBackend {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _tools: Option<&[ToolDefinition]>,
    ) -> Result<ChatMessage, PiError> {
        let last = messages
            .last()
            .and_then(|message| message.content.clone())
            .unwrap_or_default();
        Ok(ChatMessage::assistant(format!("You said: {last}")))
    }
}

#[tokio::test]
async fn chat_conversation_lifecycle() {
    let backend: Arc<dyn ChatBackend> = Arc::new(EchoBackend);
    let app = app_with(Ok(backend));

    let (status, json) = send(&app, post("/chat", json!({ "message": "hello" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["reply"], "You said: hello");
    let id = json["conversation_id"].as_str().unwrap().to_string();

    let (_, json) = send(
        &app,
        post("/chat", json!({ "conversation_id": id, "message": "again" })),
    )
    .await;
    assert_eq!(json["conversation_id"], id.as_str());

    let (status, json) = send(&app, get(&format!("/chat/{id}/history"))).await;
    assert_eq!(status, StatusCode::OK);
    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[4]["content"], "You said: again");

    let (status, _) = send(&app, delete(&format!("/chat/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, get(&format!("/chat/{id}/history"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
