use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::chat::SessionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Generative-language service not configured")]
    NotConfigured,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Session(e) => match e {
                SessionError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
                SessionError::EmptyPrompt => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
                }
                SessionError::Busy => {
                    (StatusCode::CONFLICT, "SUBMISSION_IN_PROGRESS", e.to_string())
                }
                SessionError::CapacityExhausted(_) => {
                    tracing::warn!("Session store full: {e}");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "SESSIONS_EXHAUSTED",
                        "Too many active sessions, try again shortly".to_string(),
                    )
                }
            },
            AppError::NotConfigured => (
                StatusCode::SERVICE_UNAVAILABLE,
                "GENAI_NOT_CONFIGURED",
                "El analizador IA no está configurado: falta GENAI_API_KEY.".to_string(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
