//! HTTP transport for `generateContent`. One call = one attempt; retries live
//! in `GenAiClient`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{GenAiError, GenerateContentRequest, GenerateContentResponse};

/// A single request/response exchange with the generative-language service.
///
/// `HttpTransport` is the production implementation; tests substitute their own.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenAiError>;
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

pub struct HttpTransport {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, GenAiError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: generate_content_url(base_url, model),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn generate_content_url(base_url: &str, model: &str) -> String {
    format!(
        "{}/v1beta/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    )
}

#[async_trait]
impl GenerationTransport for HttpTransport {
    async fn generate(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenAiError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(GenAiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
