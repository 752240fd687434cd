//! Axum HTTP API.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Welcome message |
//! | GET | `/health` | Health check |
//! | POST | `/start` | Start a game |
//! | POST | `/game/{id}/play` | Guess one digit |
//! | POST | `/game/{id}/verify` | Verify a run of digits |
//! | GET | `/game/{id}/status` | Progress of a game |
//! | GET | `/game/{id}/hint?count=N` | Reveal upcoming digits |
//! | DELETE | `/game/{id}` | End a game |
//! | POST | `/quiz/start` | Start a position quiz |
//! | POST | `/quiz/{id}/check` | Answer a position quiz |
//! | POST | `/chat` | One chat turn with the LLM |
//! | GET | `/chat/{id}/history` | Messages of a conversation |
//! | DELETE | `/chat/{id}` | Forget a conversation |

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, instrument, warn};

use crate::chat::{ChatStore, ToolInvocation, chat_turn};
use crate::error::{PiError, PiErrorKind};
use crate::llm_client::{ChatBackend, ChatMessage};
use crate::protocol::{
    EndGameResponse, GameStatusResponse, GuessRequest, GuessResponse, HintQuery, HintResponse,
    QuizGuessRequest, QuizGuessResponse, StartGameRequest, StartGameResponse, StartQuizRequest,
    StartQuizResponse, VerifySequenceRequest, VerifySequenceResponse,
};
use crate::service::PiService;

/// Shared state of every handler.
#[derive(Clone)]
pub struct AppState {
    service: PiService,
    chats: ChatStore,
    backend: Result<Arc<dyn ChatBackend>, PiError>,
}

impl AppState {
    /// Bundles the service, the conversation store and the chat backend.
    /// A backend error is reported by `/chat` only.
    pub fn new(
        service: PiService,
        chats: ChatStore,
        backend: Result<Arc<dyn ChatBackend>, PiError>,
    ) -> Self {
        Self {
            service,
            chats,
            backend,
        }
    }

    /// The game service.
    pub fn service(&self) -> &PiService {
        &self.service
    }

    /// The conversation store.
    pub fn chats(&self) -> &ChatStore {
        &self.chats
    }
}

/// Builds the router with permissive CORS.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health_check))
        .route("/start", post(handle_start_game))
        .route("/game/{id}", delete(handle_end_game))
        .route("/game/{id}/play", post(handle_play_turn))
        .route("/game/{id}/verify", post(handle_verify))
        .route("/game/{id}/status", get(handle_status))
        .route("/game/{id}/hint", get(handle_hint))
        .route("/quiz/start", post(handle_start_quiz))
        .route("/quiz/{id}/check", post(handle_check_quiz))
        .route("/chat", post(handle_chat))
        .route("/chat/{id}", delete(handle_clear_chat))
        .route("/chat/{id}/history", get(handle_chat_history))
        .layer(cors)
        .with_state(state)
}

/// Error response: `{ "error": <message>, "code": <KIND> }`.
#[derive(Debug)]
pub struct ApiError(pub PiError);

impl From<PiError> for ApiError {
    fn from(err: PiError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(PiError::invalid_input(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(PiError::invalid_input(rejection.body_text()))
    }
}

fn status_for(kind: PiErrorKind) -> StatusCode {
    match kind {
        PiErrorKind::NotFound => StatusCode::NOT_FOUND,
        PiErrorKind::InvalidInput | PiErrorKind::OutOfRange => StatusCode::BAD_REQUEST,
        PiErrorKind::AlreadyTerminal => StatusCode::CONFLICT,
        PiErrorKind::Configuration => StatusCode::SERVICE_UNAVAILABLE,
        PiErrorKind::Upstream => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind);
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        } else {
            warn!(error = %self.0, "Request rejected");
        }
        let body = json!({ "error": self.0.message, "code": self.0.kind.as_ref() });
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ── Games ───────────────────────────────────────────────────────────

async fn handle_root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Welcome to the Can You Pi?" }))
}

async fn handle_health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "OK" }))
}

#[instrument(skip(state))]
async fn handle_start_game(
    State(state): State<AppState>,
    request: Result<Json<StartGameRequest>, JsonRejection>,
) -> ApiResult<StartGameResponse> {
    let Json(request) = request?;
    Ok(Json(
        state
            .service
            .start_game(request.mode, request.start_position)?,
    ))
}

#[instrument(skip(state))]
async fn handle_play_turn(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<GuessRequest>, JsonRejection>,
) -> ApiResult<GuessResponse> {
    let Json(request) = request?;
    Ok(Json(state.service.play_turn(&id, &request.input)?))
}

#[instrument(skip(state))]
async fn handle_verify(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<VerifySequenceRequest>, JsonRejection>,
) -> ApiResult<VerifySequenceResponse> {
    let Json(request) = request?;
    Ok(Json(state.service.verify(&id, &request.sequence)?))
}

#[instrument(skip(state))]
async fn handle_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<GameStatusResponse> {
    Ok(Json(state.service.status(&id)?))
}

#[instrument(skip(state))]
async fn handle_hint(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Result<Query<HintQuery>, QueryRejection>,
) -> ApiResult<HintResponse> {
    let Query(query) = query?;
    Ok(Json(state.service.hint(&id, query.count)?))
}

#[instrument(skip(state))]
async fn handle_end_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<EndGameResponse> {
    Ok(Json(state.service.end_game(&id)?))
}

// ── Quizzes ─────────────────────────────────────────────────────────

#[instrument(skip(state))]
async fn handle_start_quiz(
    State(state): State<AppState>,
    request: Result<Json<StartQuizRequest>, JsonRejection>,
) -> ApiResult<StartQuizResponse> {
    let Json(request) = request?;
    Ok(Json(
        state
            .service
            .start_quiz(request.position, request.max_position)?,
    ))
}

#[instrument(skip(state))]
async fn handle_check_quiz(
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Result<Json<QuizGuessRequest>, JsonRejection>,
) -> ApiResult<QuizGuessResponse> {
    let Json(request) = request?;
    Ok(Json(state.service.check_quiz(&id, &request.guess)?))
}

// ── Chat ────────────────────────────────────────────────────────────

/// Body of `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation to continue; a new one is created when absent or unknown.
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// The player's message.
    pub message: String,
}

/// Reply of `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Conversation id for the next turn.
    pub conversation_id: String,
    /// The assistant's answer.
    pub reply: String,
    /// Tools the model ran this turn.
    pub tools_used: Vec<ToolInvocation>,
}

/// Body of `GET /chat/{id}/history`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistoryResponse {
    /// Conversation id.
    pub conversation_id: String,
    /// Every message, system prompt first.
    pub messages: Vec<ChatMessage>,
}

#[instrument(skip(state, request))]
async fn handle_chat(
    State(state): State<AppState>,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<ChatResponse> {
    let Json(request) = request?;
    let backend = state.backend.clone()?;
    let handle = state.chats.get_or_create(request.conversation_id.as_deref());
    let mut conversation = handle.lock().await;

    let reply = chat_turn(
        backend.as_ref(),
        &state.service,
        &mut conversation,
        &request.message,
    )
    .await?;

    Ok(Json(ChatResponse {
        conversation_id: conversation.id().to_string(),
        reply: reply.reply,
        tools_used: reply.tools_used,
    }))
}

#[instrument(skip(state))]
async fn handle_chat_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ChatHistoryResponse> {
    let messages = state.chats.history(&id).await?;
    Ok(Json(ChatHistoryResponse {
        conversation_id: id,
        messages,
    }))
}

#[instrument(skip(state))]
async fn handle_clear_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<serde_json::Value> {
    if !state.chats.remove(&id) {
        return Err(PiError::not_found("Conversation not found").into());
    }
    Ok(Json(json!({
        "conversation_id": id,
        "message": "Conversation cleared",
    })))
}
