use axum::{extract::State, Json};

use crate::models::profile::ProfileRecord;
use crate::state::AppState;

/// GET /api/v1/profile
pub async fn handle_get_profile(State(state): State<AppState>) -> Json<ProfileRecord> {
    Json(state.profile.as_ref().clone())
}
