mod chat;
mod config;
mod errors;
mod genai_client;
mod identity;
mod models;
mod profile;
mod routes;
mod state;
mod ui;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::chat::SessionStore;
use crate::config::Config;
use crate::genai_client::{GenAiClient, HttpTransport};
use crate::identity::{IdentityBootstrap, IdentitySession, DEFAULT_IDENTITY_URL};
use crate::models::profile::ProfileRecord;
use crate::profile::prompts::analyst_system_instruction;
use crate::routes::build_router;
use crate::state::AppState;
use crate::ui::PageRenderer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails only on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Profile Analyzer v{}", env!("CARGO_PKG_VERSION"));

    let profile = Arc::new(ProfileRecord::default_profile());

    // Initialize generative-language client
    let genai = build_genai_client(&config, &profile)?;

    // Optional identity bootstrap
    let identity = bootstrap_identity(&config).await;

    let pages = Arc::new(PageRenderer::new().context("compiling page templates")?);

    let state = AppState {
        genai,
        sessions: SessionStore::new(config.session_capacity),
        profile,
        pages,
        identity,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the client once; `None` when no credential is configured.
fn build_genai_client(config: &Config, profile: &ProfileRecord) -> Result<Option<GenAiClient>> {
    let Some(api_key) = config.genai_api_key.clone() else {
        warn!("GENAI_API_KEY is not set; the AI analyst will refuse questions");
        return Ok(None);
    };

    let transport = HttpTransport::new(
        &config.genai_base_url,
        &config.genai_model,
        api_key,
        Duration::from_secs(config.genai_timeout_secs),
    )
    .context("building generative-language HTTP client")?;

    info!(
        "Generative-language client initialized (model: {}, endpoint: {})",
        config.genai_model,
        transport.endpoint()
    );

    Ok(Some(GenAiClient::new(
        Arc::new(transport),
        analyst_system_instruction(profile),
    )))
}

async fn bootstrap_identity(config: &Config) -> Option<Arc<IdentitySession>> {
    let auth = config.auth.as_ref()?;
    info!(
        "Identity bootstrap enabled (domain: {}, project: {})",
        auth.domain.as_deref().unwrap_or("-"),
        auth.project_id.as_deref().unwrap_or("-")
    );

    let result = match IdentityBootstrap::new(DEFAULT_IDENTITY_URL) {
        Ok(bootstrap) => bootstrap.sign_in(auth).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(session) => Some(Arc::new(session)),
        Err(e) => {
            error!("Identity bootstrap failed, continuing without it: {e}");
            None
        }
    }
}
