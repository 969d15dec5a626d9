use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version and which upstream collaborators are wired.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "profile-analyzer",
        "genai_configured": state.genai.is_some(),
        "genai_model": state.config.genai_model,
        "active_sessions": state.sessions.len(),
        "identity": state.identity.as_deref(),
    }))
}
