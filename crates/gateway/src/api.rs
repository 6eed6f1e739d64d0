//! Chat API, nested under `/api/chat`.
//!
//! Endpoints:
//!
//! - `POST   /message`                      — One chat turn (generic or action)
//! - `POST   /action`                       — One action turn; the action type is mandatory
//! - `GET    /history/{sessionId}?userId=`  — Full session history
//! - `GET    /sessions?userId=`             — Active sessions of a user
//! - `DELETE /sessions/{sessionId}?userId=` — Deactivate a session
//! - `GET    /prompts?subject=&actionType=` — Suggested follow-up prompts
//! - `POST   /prompts/custom?category=&prompt=` — Add an educator prompt
//! - `GET    /health`                       — Liveness

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use eduassist_core::{ChatRequest, ChatResponse, Error, SessionView};

use crate::SharedState;

// ── Router ────────────────────────────────────────────────────────────────

pub fn chat_router(state: SharedState) -> Router {
    Router::new()
        .route("/message", post(message_handler))
        .route("/action", post(action_handler))
        .route("/history/{session_id}", get(history_handler))
        .route("/sessions", get(sessions_handler))
        .route("/sessions/{session_id}", delete(deactivate_handler))
        .route("/prompts", get(prompts_handler))
        .route("/prompts/custom", post(custom_prompt_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

// ── Types ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptsQuery {
    pub subject: Option<String>,
    pub action_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CustomPromptQuery {
    pub category: String,
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub provider: String,
    pub uptime_secs: i64,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Missing and foreign sessions are both 404; anything else is a 500 with the cause logged.
fn session_error(session_id: &str, err: Error) -> ApiError {
    match err {
        Error::NotFound(_) => api_error(StatusCode::NOT_FOUND, format!("Session '{session_id}' not found")),
        other => {
            error!(session_id, error = %other, "Session lookup failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read session data")
        }
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn message_handler(
    State(state): State<SharedState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    info!(user_id = %request.user_id, "Received chat request");
    Json(state.orchestrator.process_chat(&request).await)
}

async fn action_handler(
    State(state): State<SharedState>,
    Json(request): Json<ChatRequest>,
) -> (StatusCode, Json<ChatResponse>) {
    let Some(action_type) = request.action_type() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ChatResponse::error("Action type must be specified")),
        );
    };
    info!(user_id = %request.user_id, action_type, "Received action request");
    (StatusCode::OK, Json(state.orchestrator.process_chat(&request).await))
}

async fn history_handler(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Json<SessionView>, ApiError> {
    state
        .orchestrator
        .history(&session_id, &query.user_id)
        .await
        .map(Json)
        .map_err(|e| session_error(&session_id, e))
}

async fn sessions_handler(
    State(state): State<SharedState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<SessionView>>, ApiError> {
    state
        .orchestrator
        .active_sessions(&query.user_id)
        .await
        .map(Json)
        .map_err(|e| {
            error!(user_id = %query.user_id, error = %e, "Listing sessions failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to list sessions")
        })
}

async fn deactivate_handler(
    State(state): State<SharedState>,
    Path(session_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .orchestrator
        .deactivate(&session_id, &query.user_id)
        .await
        .map_err(|e| session_error(&session_id, e))?;
    Ok(Json(MessageResponse {
        message: format!("Session '{session_id}' deactivated"),
    }))
}

async fn prompts_handler(
    State(state): State<SharedState>,
    Query(query): Query<PromptsQuery>,
) -> Json<Vec<String>> {
    Json(
        state
            .orchestrator
            .suggestions(query.subject.as_deref(), query.action_type.as_deref()),
    )
}

async fn custom_prompt_handler(
    State(state): State<SharedState>,
    Query(query): Query<CustomPromptQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    if query.category.trim().is_empty() || query.prompt.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Category and prompt are required"));
    }
    state.orchestrator.add_custom_prompt(&query.category, &query.prompt);
    Ok(Json(MessageResponse {
        message: "Custom prompt added successfully".into(),
    }))
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        service: "chat-service".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        provider: state.orchestrator.provider_name().into(),
        uptime_secs: (chrono::Utc::now() - state.start_time).num_seconds(),
    })
}
