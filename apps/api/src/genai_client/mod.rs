//! Generative-language client: the single point of entry for all Gemini calls.
//!
//! ARCHITECTURAL RULE: No other module may talk to the generative-language
//! endpoint directly. Handlers hold a `GenAiClient` from `AppState`.
//!
//! Every call carries the same fixed system instruction; only the prompt varies.
//! Failed attempts are retried with exponential backoff and, once the retry
//! budget is spent, the call resolves to a fixed fallback message instead of
//! an error.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

pub mod transport;

pub use transport::{GenerationTransport, HttpTransport};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";
const MAX_ATTEMPTS: u32 = 5;

/// Shown when every attempt failed.
pub const UNAVAILABLE_MESSAGE: &str =
    "Lo siento, el servicio de análisis no está disponible en este momento.";

/// Shown when the service answered but the first candidate carried no text.
pub const NO_CONTENT_MESSAGE: &str = "El servicio de análisis no generó ninguna respuesta.";

#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub system_instruction: Content,
}

impl GenerateContentRequest {
    pub fn new(prompt: &str, system_instruction: &str) -> Self {
        Self {
            contents: vec![Content::text(prompt)],
            system_instruction: Content::text(system_instruction),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    fn text(text: &str) -> Self {
        Self {
            parts: vec![Part {
                text: Some(text.to_string()),
            }],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if any.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Outcome
// ────────────────────────────────────────────────────────────────────────────

/// Result of one `generate` call. Never an error: exhaustion and empty answers
/// are ordinary outcomes that still produce a chat message.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Answered(String),
    NoContent,
    Unavailable { attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Answered,
    NoContent,
    Unavailable,
}

impl GenerationOutcome {
    /// The text to append to the transcript as the assistant message.
    pub fn message(&self) -> &str {
        match self {
            GenerationOutcome::Answered(text) => text,
            GenerationOutcome::NoContent => NO_CONTENT_MESSAGE,
            GenerationOutcome::Unavailable { .. } => UNAVAILABLE_MESSAGE,
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            GenerationOutcome::Answered(_) => OutcomeKind::Answered,
            GenerationOutcome::NoContent => OutcomeKind::NoContent,
            GenerationOutcome::Unavailable { .. } => OutcomeKind::Unavailable,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Retry policy
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Wait after the given failed attempt (1-based): `base * 2^attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(1u32 << attempt.min(31))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Constructed once at startup and shared through `AppState`.
#[derive(Clone)]
pub struct GenAiClient {
    transport: Arc<dyn GenerationTransport>,
    system_instruction: Arc<str>,
    retry: RetryPolicy,
}

impl GenAiClient {
    pub fn new(
        transport: Arc<dyn GenerationTransport>,
        system_instruction: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            system_instruction: Arc::from(system_instruction.into()),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sends `prompt` with the fixed system instruction. The caller must have
    /// rejected blank prompts already.
    ///
    /// Every attempt sends the same body. Attempts run one after another and
    /// each failure (transport error, non-2xx status, undecodable body) is
    /// followed by `delay_after(attempt)` before the next try.
    pub async fn generate(&self, prompt: &str) -> GenerationOutcome {
        let request = GenerateContentRequest::new(prompt, &self.system_instruction);

        for attempt in 1..=self.retry.max_attempts {
            match self.transport.generate(&request).await {
                Ok(response) => {
                    if let Some(usage) = &response.usage_metadata {
                        debug!(
                            "Generation succeeded on attempt {}: prompt_tokens={}, candidate_tokens={}",
                            attempt, usage.prompt_token_count, usage.candidates_token_count
                        );
                    }
                    return match response.text() {
                        Some(text) if !text.trim().is_empty() => {
                            GenerationOutcome::Answered(text.to_string())
                        }
                        _ => {
                            let finish_reason = response
                                .candidates
                                .first()
                                .and_then(|c| c.finish_reason.as_deref())
                                .unwrap_or("none");
                            warn!(
                                "Generation response carried no candidate text (finish reason: {})",
                                finish_reason
                            );
                            GenerationOutcome::NoContent
                        }
                    };
                }
                Err(e) => {
                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        "Generation attempt {}/{} failed ({}), waiting {}ms",
                        attempt,
                        self.retry.max_attempts,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        error!(
            "Generation unavailable after {} attempts",
            self.retry.max_attempts
        );
        GenerationOutcome::Unavailable {
            attempts: self.retry.max_attempts,
        }
    }
}
