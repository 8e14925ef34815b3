//! Configuration (layered: code > env > defaults).

use std::path::PathBuf;
use std::time::Duration;

use crate::auth::store::DEFAULT_TOKEN_FILE;

pub const DEFAULT_CLIENT_ID: &str = "d2b59caf73a52c2d8c6a5be3e7bd9733";
pub const DEFAULT_AUTH_BASE_URL: &str = "https://myanimelist.net";
pub const DEFAULT_API_BASE_URL: &str = "https://api.myanimelist.net/v2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Runtime settings for the client.
///
/// Resolution order:
/// 1. Explicit values set through the `with_*` methods (CLI flags)
/// 2. Environment variables (`MAL_CLIENT_ID`, `MAL_AUTH_BASE_URL`,
///    `MAL_API_BASE_URL`, `MAL_TOKEN_FILE`, `MAL_TIMEOUT_MS`), including a `.env` file
/// 3. Built-in defaults
#[derive(Debug, Clone, PartialEq)]
pub struct MalConfig {
    pub client_id: String,
    pub auth_base_url: String,
    pub api_base_url: String,
    pub token_file: PathBuf,
    pub request_timeout: Duration,
}

impl Default for MalConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl MalConfig {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source; unset or blank values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(client_id) = get("MAL_CLIENT_ID") {
            config.client_id = client_id;
        }
        if let Some(url) = get("MAL_AUTH_BASE_URL") {
            config.auth_base_url = url;
        }
        if let Some(url) = get("MAL_API_BASE_URL") {
            config.api_base_url = url;
        }
        if let Some(path) = get("MAL_TOKEN_FILE") {
            config.token_file = PathBuf::from(path);
        }
        if let Some(raw) = get("MAL_TIMEOUT_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => config.request_timeout = Duration::from_millis(ms),
                _ => tracing::warn!(value = %raw, "ignoring invalid MAL_TIMEOUT_MS"),
            }
        }

        config
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_auth_base_url(mut self, url: impl Into<String>) -> Self {
        self.auth_base_url = url.into();
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_token_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_file = path.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub(crate) fn authorize_endpoint(&self) -> String {
        format!("{}/v1/oauth2/authorize", self.auth_base_url.trim_end_matches('/'))
    }

    pub(crate) fn token_endpoint(&self) -> String {
        format!("{}/v1/oauth2/token", self.auth_base_url.trim_end_matches('/'))
    }

    pub(crate) fn api_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
