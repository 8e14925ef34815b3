//! Bearer-authenticated MyAnimeList v2 resource endpoints.

use reqwest::{Method, RequestBuilder};
use serde_json::Value;

use crate::config::MalConfig;
use crate::error::{ClientError, Result};

/// Status and decoded body of a successful API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

/// Thin client for the resource API. Every call takes the access token
/// explicitly; it holds no session state of its own.
///
/// # Example
/// ```no_run
/// use malcli::api::MalApi;
/// use malcli::config::MalConfig;
///
/// # async fn run() -> malcli::error::Result<()> {
/// let api = MalApi::new(&MalConfig::default())?;
/// let me = api.user_info("access-token", Some("anime_statistics")).await?;
/// println!("{:#}", me.body);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MalApi {
    client: reqwest::Client,
    config: MalConfig,
}

impl MalApi {
    pub fn new(config: &MalConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// `GET /users/@me`, optionally with a `fields` selector.
    pub async fn user_info(&self, access_token: &str, fields: Option<&str>) -> Result<ApiResponse> {
        let mut req = self.request(Method::GET, "users/@me", access_token);
        if let Some(fields) = fields {
            req = req.query(&[("fields", fields)]);
        }
        self.send(req).await
    }

    /// `GET /users/@me?fields=anime_statistics`.
    pub async fn anime_statistics(&self, access_token: &str) -> Result<ApiResponse> {
        self.user_info(access_token, Some("anime_statistics")).await
    }

    /// `GET /anime?q=...`.
    pub async fn search_anime(
        &self,
        access_token: &str,
        query: &str,
        limit: Option<u32>,
    ) -> Result<ApiResponse> {
        let mut req = self
            .request(Method::GET, "anime", access_token)
            .query(&[("q", query)]);
        if let Some(limit) = limit {
            req = req.query(&[("limit", limit)]);
        }
        self.send(req).await
    }

    /// `GET /users/@me/animelist` with each entry's list status.
    pub async fn anime_list(
        &self,
        access_token: &str,
        status: Option<&str>,
        limit: Option<u32>,
    ) -> Result<ApiResponse> {
        let mut req = self
            .request(Method::GET, "users/@me/animelist", access_token)
            .query(&[("fields", "list_status")]);
        if let Some(status) = status {
            req = req.query(&[("status", status)]);
        }
        if let Some(limit) = limit {
            req = req.query(&[("limit", limit)]);
        }
        self.send(req).await
    }

    /// `PATCH /anime/{id}/my_list_status` setting the watched-episode count.
    pub async fn update_watched_episodes(
        &self,
        access_token: &str,
        anime_id: u64,
        episodes: u32,
    ) -> Result<ApiResponse> {
        let episodes = episodes.to_string();
        let req = self
            .request(
                Method::PATCH,
                &format!("anime/{anime_id}/my_list_status"),
                access_token,
            )
            .form(&[("num_watched_episodes", episodes.as_str())]);
        self.send(req).await
    }

    fn request(&self, method: Method, path: &str, access_token: &str) -> RequestBuilder {
        self.client
            .request(method, self.config.api_url(path))
            .bearer_auth(access_token)
    }

    async fn send(&self, req: RequestBuilder) -> Result<ApiResponse> {
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "API request rejected");
            return Err(ClientError::api(status.as_u16(), text));
        }
        Ok(ApiResponse {
            status: status.as_u16(),
            body: decode_body(&text),
        })
    }
}

fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
