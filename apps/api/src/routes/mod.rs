pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::chat::handlers;
use crate::profile::handlers::handle_get_profile;
use crate::state::AppState;
use crate::ui;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ui::index_handler))
        .route("/health", get(health::health_handler))
        // Profile view
        .route("/api/v1/profile", get(handle_get_profile))
        // Analyst view
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route("/api/v1/sessions/:id/view", put(handlers::handle_set_view))
        .route("/api/v1/sessions/:id/messages", post(handlers::handle_ask))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;
    use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::chat::SessionStore;
    use crate::config::Config;
    use crate::genai_client::testing::{answer, ScriptedTransport};
    use crate::genai_client::{
        GenAiClient, GenerationTransport, HttpTransport, RetryPolicy, UNAVAILABLE_MESSAGE,
    };
    use crate::models::profile::ProfileRecord;
    use crate::ui::PageRenderer;

    fn test_state(transport: Option<Arc<dyn GenerationTransport>>) -> AppState {
        let config = Config::from_lookup(|_| None).unwrap();
        AppState {
            genai: transport.map(|t| {
                GenAiClient::new(t, "persona").with_retry_policy(RetryPolicy {
                    max_attempts: 5,
                    base_delay: Duration::from_millis(1),
                })
            }),
            sessions: SessionStore::new(config.session_capacity),
            profile: Arc::new(ProfileRecord::default_profile()),
            pages: Arc::new(PageRenderer::new().unwrap()),
            identity: None,
            config,
        }
    }

    fn aws_answering_app() -> Router {
        let transport = ScriptedTransport::new(vec![], || {
            Ok(answer("Tiene experiencia en automatización con AWS"))
        });
        build_router(test_state(Some(Arc::new(transport))))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn new_session(app: &Router) -> String {
        let (status, session) = send(app, "POST", "/api/v1/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        session["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_health_reports_configuration() {
        let app = aws_answering_app();
        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["genai_configured"], true);
        assert_eq!(body["identity"], Value::Null);
    }

    #[tokio::test]
    async fn test_profile_endpoint_returns_cv() {
        let app = aws_answering_app();
        let (status, body) = send(&app, "GET", "/api/v1/profile", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Diego Aparicio Sánchez");
        assert_eq!(body["skills"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_index_page_renders_html() {
        let app = aws_answering_app();
        let request = Request::builder()
            .uri("/?view=analyst")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(page.contains(r#"<section id="panel-analyst" class="panel active">"#));
    }

    #[tokio::test]
    async fn test_ask_about_aws_appends_answer() {
        let app = aws_answering_app();
        let id = new_session(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/messages"),
            Some(json!({ "prompt": "¿Qué experiencia tiene en AWS?" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "answered");
        assert_eq!(body["reply"]["role"], "assistant");
        assert_eq!(
            body["reply"]["content"],
            "Tiene experiencia en automatización con AWS"
        );
        assert_eq!(body["session"]["loading"], false);

        let messages = body["session"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "¿Qué experiencia tiene en AWS?");
    }

    #[tokio::test]
    async fn test_blank_prompt_is_rejected_without_history_change() {
        let app = aws_answering_app();
        let id = new_session(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/messages"),
            Some(json!({ "prompt": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (_, session) = send(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert!(session["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credential_refuses_questions() {
        let app = build_router(test_state(None));
        let id = new_session(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/messages"),
            Some(json!({ "prompt": "hola" })),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "GENAI_NOT_CONFIGURED");

        let (_, session) = send(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert!(session["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found_even_without_credential() {
        let app = build_router(test_state(None));

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{}/messages", Uuid::new_v4()),
            Some(json!({ "prompt": "hola" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_view_switch_and_session_lifecycle() {
        let app = aws_answering_app();
        let id = new_session(&app).await;

        let (status, body) = send(
            &app,
            "PUT",
            &format!("/api/v1/sessions/{id}/view"),
            Some(json!({ "view": "analyst" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"], "analyst");

        let (status, _) = send(&app, "DELETE", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_upstream_500_on_every_attempt_yields_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(5)
            .mount(&server)
            .await;

        let transport = HttpTransport::new(
            &server.uri(),
            "test-model",
            "test-key".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        let app = build_router(test_state(Some(Arc::new(transport))));
        let id = new_session(&app).await;

        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/v1/sessions/{id}/messages"),
            Some(json!({ "prompt": "¿Qué experiencia tiene en AWS?" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "unavailable");
        let messages = body["session"]["messages"].as_array().unwrap();
        assert_eq!(messages.last().unwrap()["content"], UNAVAILABLE_MESSAGE);
        assert_eq!(body["session"]["loading"], false);
    }
}
