//! Chat relay handler.
//!
//! `POST /chat` validates the caller's text, forwards it to the upstream
//! provider behind a fixed system instruction, and wraps the first reply
//! choice as `{"response": ...}`.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use relay_core::completion::models::Reply;
use relay_core::completion::prompt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::AppState;
use crate::error::{AppError, AppResult};

/// Request body for `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub text: String,
}

/// Response body for `POST /chat`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: Reply,
}

/// `POST /chat` — relay one message to the chat model.
pub async fn chat_handler(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> AppResult<Json<ChatResponse>> {
    let Json(request) = body.map_err(|e| AppError::Validation(e.body_text()))?;

    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text must not be empty".into()));
    }

    debug!(
        model = state.provider.model(),
        chars = request.text.chars().count(),
        "relaying chat message"
    );

    let reply = state.provider.complete(&prompt(&request.text)).await?;

    info!(
        model = state.provider.model(),
        refused = reply.content.is_none(),
        "chat reply received"
    );

    Ok(Json(ChatResponse { response: reply }))
}
