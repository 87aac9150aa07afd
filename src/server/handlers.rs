//! HTTP request handlers

use super::AppState;
use crate::service::{ChatReply, ChatRequest};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

/// Create the service router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

// ============================================================
// Chat
// ============================================================

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::Unprocessable(e.body_text()))?;

    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::Unprocessable(
            "message must not be empty".to_string(),
        ));
    }

    match request.session_id {
        Some(session_id) => {
            let reply = session_turn(&state, &session_id, message)?;
            Ok(Json(ChatReply::text(reply)))
        }
        None => {
            let (reply, context) = echoed_turn(&state, message, request.context)?;
            Ok(Json(ChatReply::text(reply).with_context(context)))
        }
    }
}

/// History lives here, keyed by the client's session id
fn session_turn(state: &AppState, session_id: &str, message: &str) -> Result<String, AppError> {
    let mut sessions = state
        .sessions
        .lock()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let reply = sessions.with_history(session_id, |history| {
        let reply = state.faq.answer_with_history(message, history);
        history.push(message.to_string());
        cap(history, state.max_context);
        reply
    });

    tracing::debug!(session_id, sessions = sessions.len(), "Answered session-keyed turn");
    Ok(reply)
}

/// History travels with the request and is handed back grown by one
fn echoed_turn(
    state: &AppState,
    message: &str,
    context: Option<Value>,
) -> Result<(String, Value), AppError> {
    let mut items = match context {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(AppError::Unprocessable(
                "context must be an array".to_string(),
            ))
        }
    };

    let history: Vec<String> = items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    let reply = state.faq.answer_with_history(message, &history);

    items.push(Value::String(message.to_string()));
    cap(&mut items, state.max_context);

    Ok((reply, Value::Array(items)))
}

fn cap<T>(items: &mut Vec<T>, max: usize) {
    if items.len() > max {
        items.drain(..items.len() - max);
    }
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug, Serialize)]
struct ErrorResponse {
    detail: String,
}

#[derive(Debug)]
enum AppError {
    Unprocessable(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        tracing::warn!(status = status.as_u16(), detail = %detail, "Rejected chat request");
        (status, Json(ErrorResponse { detail })).into_response()
    }
}
