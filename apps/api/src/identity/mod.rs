//! Optional identity bootstrap against the Identity Toolkit REST API.
//!
//! Runs once at startup when `AUTH_API_KEY` is configured: a custom-token
//! sign-in if `AUTH_INITIAL_TOKEN` is present, otherwise an anonymous sign-up.
//! Nothing else in the service depends on the resulting session; a failed
//! bootstrap is logged and the service carries on without one.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::info;

use crate::config::AuthConfig;

pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com";

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("identity API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The signed-in identity, surfaced read-only on `/health`.
#[derive(Debug, Clone, Serialize)]
pub struct IdentitySession {
    pub uid: Option<String>,
    pub anonymous: bool,
    pub expires_in_secs: u64,
    pub project_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: Option<String>,
    /// Seconds, sent as a decimal string.
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

pub struct IdentityBootstrap {
    client: Client,
    base_url: String,
}

impl IdentityBootstrap {
    pub fn new(base_url: &str) -> Result<Self, IdentityError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn sign_in(&self, auth: &AuthConfig) -> Result<IdentitySession, IdentityError> {
        let (method, body, anonymous) = match &auth.initial_token {
            Some(token) => (
                "signInWithCustomToken",
                json!({ "token": token, "returnSecureToken": true }),
                false,
            ),
            None => ("signUp", json!({ "returnSecureToken": true }), true),
        };

        let url = format!("{}/v1/accounts:{}", self.base_url, method);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &auth.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(IdentityError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: SignInResponse = serde_json::from_str(&text)?;
        let session = IdentitySession {
            uid: parsed.local_id,
            anonymous,
            expires_in_secs: parsed
                .expires_in
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
            project_id: auth.project_id.clone(),
        };

        info!(
            "Identity bootstrap via {} succeeded (uid: {})",
            method,
            session.uid.as_deref().unwrap_or("unknown")
        );
        Ok(session)
    }
}
