use anyhow::{bail, Context, Result};

use crate::genai_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};

const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_SESSION_CAPACITY: usize = 1000;

/// Application configuration loaded from environment variables.
///
/// Only malformed values fail startup. A missing `GENAI_API_KEY` is allowed so
/// the profile view keeps working; chat submissions are refused instead.
#[derive(Debug, Clone)]
pub struct Config {
    pub genai_api_key: Option<String>,
    pub genai_model: String,
    pub genai_base_url: String,
    pub genai_timeout_secs: u64,
    pub auth: Option<AuthConfig>,
    pub session_capacity: usize,
    pub port: u16,
    pub rust_log: String,
}

/// Credentials for the optional identity bootstrap.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub api_key: String,
    pub domain: Option<String>,
    pub project_id: Option<String>,
    pub initial_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let auth = get("AUTH_API_KEY").map(|api_key| AuthConfig {
            api_key,
            domain: get("AUTH_DOMAIN"),
            project_id: get("AUTH_PROJECT_ID"),
            initial_token: get("AUTH_INITIAL_TOKEN"),
        });

        let session_capacity = parse_or(
            "SESSION_CAPACITY",
            get("SESSION_CAPACITY"),
            DEFAULT_SESSION_CAPACITY,
        )?;
        if session_capacity == 0 {
            bail!("SESSION_CAPACITY must be at least 1");
        }

        Ok(Config {
            genai_api_key: get("GENAI_API_KEY"),
            genai_model: get("GENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            genai_base_url: get("GENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            genai_timeout_secs: parse_or(
                "GENAI_TIMEOUT_SECS",
                get("GENAI_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?,
            auth,
            session_capacity,
            port: parse_or("PORT", get("PORT"), 8080)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
