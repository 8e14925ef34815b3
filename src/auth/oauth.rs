//! Authorization-server client: authorize URL, code exchange, refresh.

use async_trait::async_trait;

use super::error::AuthError;
use super::token::TokenRecord;
use crate::config::MalConfig;

/// The network half of the authorization flow.
///
/// Implementations never touch a token store; persisting what they return is
/// the session's job.
#[async_trait]
pub trait OAuthClient: Send + Sync {
    /// URL the user opens to grant access.
    fn authorization_url(&self, verifier: &str) -> String;

    /// Trade an authorization code for tokens (`grant_type=authorization_code`).
    async fn exchange_code(&self, verifier: &str, auth_code: &str)
        -> Result<TokenRecord, AuthError>;

    /// Trade a refresh token for a new token record (`grant_type=refresh_token`).
    async fn refresh(&self, refresh_token: &str) -> Result<TokenRecord, AuthError>;
}

/// Build the authorization URL.
///
/// MyAnimeList only supports the `plain` challenge method, so the verifier
/// itself is sent as `code_challenge` and no `code_challenge_method` is given.
pub fn build_authorization_url(authorize_endpoint: &str, client_id: &str, verifier: &str) -> String {
    format!(
        "{authorize_endpoint}?response_type=code&client_id={}&code_challenge={}",
        urlencoded(client_id),
        urlencoded(verifier),
    )
}

/// reqwest-backed [`OAuthClient`] for MyAnimeList.
///
/// # Example
/// ```no_run
/// use malcli::auth::{MalOAuthClient, OAuthClient};
/// use malcli::config::MalConfig;
///
/// let client = MalOAuthClient::new(&MalConfig::default())?;
/// println!("{}", client.authorization_url("verifier"));
/// # Ok::<(), malcli::auth::AuthError>(())
/// ```
pub struct MalOAuthClient {
    client: reqwest::Client,
    client_id: String,
    authorize_url: String,
    token_url: String,
}

impl MalOAuthClient {
    pub fn new(config: &MalConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            client_id: config.client_id.clone(),
            authorize_url: config.authorize_endpoint(),
            token_url: config.token_endpoint(),
        })
    }

    async fn post_token_form(
        &self,
        form: &[(&str, &str)],
        grant: Grant,
    ) -> Result<TokenRecord, AuthError> {
        let resp = self
            .client
            .post(&self.token_url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .form(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), grant = grant.as_str(), "token request rejected");
            return Err(match grant {
                Grant::AuthorizationCode => AuthError::AuthExchangeFailed {
                    status: status.as_u16(),
                    body,
                },
                Grant::RefreshToken => AuthError::RefreshFailed {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let body = resp.text().await?;
        serde_json::from_str::<TokenRecord>(&body).map_err(|e| {
            AuthError::InvalidResponse(format!("token response is not a token record: {e}"))
        })
    }
}

#[async_trait]
impl OAuthClient for MalOAuthClient {
    fn authorization_url(&self, verifier: &str) -> String {
        build_authorization_url(&self.authorize_url, &self.client_id, verifier)
    }

    async fn exchange_code(
        &self,
        verifier: &str,
        auth_code: &str,
    ) -> Result<TokenRecord, AuthError> {
        self.post_token_form(
            &[
                ("client_id", self.client_id.as_str()),
                ("code", auth_code),
                ("code_verifier", verifier),
                ("grant_type", "authorization_code"),
            ],
            Grant::AuthorizationCode,
        )
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenRecord, AuthError> {
        self.post_token_form(
            &[
                ("client_id", self.client_id.as_str()),
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
            Grant::RefreshToken,
        )
        .await
    }
}

#[derive(Debug, Clone, Copy)]
enum Grant {
    AuthorizationCode,
    RefreshToken,
}

impl Grant {
    fn as_str(self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
        }
    }
}

fn urlencoded(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
