//! Axum route handlers for page sessions and the analyst chat.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::chat::{submit_prompt, SessionView, Submission, View};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SetViewRequest {
    pub view: View,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub prompt: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
///
/// Called on every page load; a reload starts from an empty transcript.
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let session = state.sessions.create()?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.sessions.get(session_id)?))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(session_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/view
pub async fn handle_set_view(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<SetViewRequest>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.sessions.set_view(session_id, request.view)?))
}

/// POST /api/v1/sessions/:id/messages
///
/// Appends the prompt, waits for the analyst reply (retries included) and
/// returns it together with the updated session. An unknown session is 404;
/// a known one is refused when the generative-language credential is missing.
pub async fn handle_ask(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<AskRequest>,
) -> Result<Json<Submission>, AppError> {
    state.sessions.get(session_id)?;
    let genai = state.genai.as_ref().ok_or(AppError::NotConfigured)?;

    let submission = submit_prompt(&state.sessions, genai, session_id, request.prompt).await?;
    Ok(Json(submission))
}
