//! Server-rendered page shell. The profile view is rendered here; the analyst
//! view talks to the session API from the browser.

use anyhow::Context as _;
use axum::{
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;
use tera::{Context, Tera};

use crate::chat::View;
use crate::errors::AppError;
use crate::models::profile::ProfileRecord;
use crate::state::AppState;

const INDEX_NAME: &str = "index.html";
const INDEX_TEMPLATE: &str = include_str!("templates/index.html");

/// Compiled page templates, built once at startup.
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template(INDEX_NAME, INDEX_TEMPLATE)?;
        Ok(Self { tera })
    }

    pub fn render_index(
        &self,
        profile: &ProfileRecord,
        view: View,
        genai_configured: bool,
    ) -> Result<String, tera::Error> {
        let mut context = Context::new();
        context.insert("profile", profile);
        context.insert("view", &view);
        context.insert("genai_configured", &genai_configured);
        self.tera.render(INDEX_NAME, &context)
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub view: Option<View>,
}

/// GET /
pub async fn index_handler(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Html<String>, AppError> {
    let page = state
        .pages
        .render_index(
            &state.profile,
            query.view.unwrap_or_default(),
            state.genai.is_some(),
        )
        .context("rendering index page")?;
    Ok(Html(page))
}
