use std::sync::Arc;

use crate::chat::SessionStore;
use crate::config::Config;
use crate::genai_client::GenAiClient;
use crate::identity::IdentitySession;
use crate::models::profile::ProfileRecord;
use crate::ui::PageRenderer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `None` when `GENAI_API_KEY` is missing; chat submissions are refused.
    pub genai: Option<GenAiClient>,
    pub sessions: SessionStore,
    pub profile: Arc<ProfileRecord>,
    pub pages: Arc<PageRenderer>,
    /// Set only when the identity bootstrap ran and succeeded.
    pub identity: Option<Arc<IdentitySession>>,
    pub config: Config,
}
