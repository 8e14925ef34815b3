//! Per-run session: the current user's tokens and the transitions between
//! "nothing loaded" and "tokens loaded".

use std::fmt;
use std::sync::Arc;

use super::error::AuthError;
use super::oauth::OAuthClient;
use super::store::{TokenLookup, TokenStore};
use super::token::TokenRecord;
use super::verifier::{generate_verifier, VerifierSource};

/// Whether the session currently holds tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unloaded,
    Loaded,
}

/// An authorization attempt waiting for the user's code.
///
/// Returned by [`Session::start_authorization`] and consumed by
/// [`Session::complete_authorization`], which drops the verifier whether the
/// exchange succeeds or not.
pub struct PendingAuthorization {
    authorize_url: String,
    verifier: String,
}

impl PendingAuthorization {
    pub fn authorize_url(&self) -> &str {
        &self.authorize_url
    }
}

impl fmt::Debug for PendingAuthorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingAuthorization")
            .field("authorize_url", &self.authorize_url)
            .field("verifier", &"..")
            .finish()
    }
}

/// Owns the in-memory tokens for one interactive run.
///
/// Starts [`SessionState::Unloaded`]. Only `load`, `complete_authorization`
/// and `refresh` change state, and a failed operation never discards tokens
/// that were already loaded.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use malcli::auth::{FileTokenStore, MalOAuthClient, Session};
/// use malcli::config::MalConfig;
///
/// # async fn run() -> Result<(), malcli::auth::AuthError> {
/// let config = MalConfig::default();
/// let mut session = Session::new(
///     "alice",
///     Arc::new(FileTokenStore::new(&config.token_file)),
///     Arc::new(MalOAuthClient::new(&config)?),
/// );
/// let pending = session.start_authorization()?;
/// println!("{}", pending.authorize_url());
/// session.complete_authorization(pending, "code-from-browser").await?;
/// # Ok(())
/// # }
/// ```
pub struct Session {
    username: String,
    tokens: Option<TokenRecord>,
    store: Arc<dyn TokenStore>,
    oauth: Arc<dyn OAuthClient>,
    verifier_source: VerifierSource,
}

impl Session {
    pub fn new(
        username: impl Into<String>,
        store: Arc<dyn TokenStore>,
        oauth: Arc<dyn OAuthClient>,
    ) -> Self {
        Self {
            username: username.into(),
            tokens: None,
            store,
            oauth,
            verifier_source: generate_verifier,
        }
    }

    /// Swap the verifier generator, e.g. for a deterministic one in tests.
    pub fn with_verifier_source(mut self, source: VerifierSource) -> Self {
        self.verifier_source = source;
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn state(&self) -> SessionState {
        if self.tokens.is_some() {
            SessionState::Loaded
        } else {
            SessionState::Unloaded
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.tokens.is_some()
    }

    pub fn current(&self) -> Option<&TokenRecord> {
        self.tokens.as_ref()
    }

    /// Access token for authenticated calls, or `PreconditionFailed` when unloaded.
    pub fn access_token(&self) -> Result<&str, AuthError> {
        self.current()
            .map(|record| record.access_token.as_str())
            .ok_or_else(AuthError::no_session)
    }

    /// Adopt the stored tokens for this user.
    pub fn load(&mut self) -> Result<&TokenRecord, AuthError> {
        match self.store.load(&self.username)? {
            TokenLookup::Found(record) => {
                tracing::info!(username = %self.username, "tokens loaded");
                Ok(&*self.tokens.insert(record))
            }
            lookup @ (TokenLookup::NotFound | TokenLookup::Corrupt) => {
                tracing::debug!(username = %self.username, ?lookup, "no stored tokens");
                Err(AuthError::TokenNotFound {
                    username: self.username.clone(),
                })
            }
        }
    }

    /// Generate a verifier and the URL the user must visit.
    pub fn start_authorization(&self) -> Result<PendingAuthorization, AuthError> {
        let verifier = (self.verifier_source)()?;
        let authorize_url = self.oauth.authorization_url(&verifier);
        Ok(PendingAuthorization {
            authorize_url,
            verifier,
        })
    }

    /// Exchange the code, persist the tokens, then adopt them.
    pub async fn complete_authorization(
        &mut self,
        pending: PendingAuthorization,
        auth_code: &str,
    ) -> Result<&TokenRecord, AuthError> {
        let auth_code = auth_code.trim();
        if auth_code.is_empty() {
            return Err(AuthError::PreconditionFailed(
                "No authorization code provided".to_string(),
            ));
        }
        let record = self
            .oauth
            .exchange_code(&pending.verifier, auth_code)
            .await?;
        drop(pending);
        self.store.save(&self.username, &record)?;
        tracing::info!(username = %self.username, "authorized");
        Ok(&*self.tokens.insert(record))
    }

    /// Replace the current tokens using the refresh token.
    ///
    /// The response overwrites the whole record; fields it omits are not
    /// carried over. On failure the current tokens and the store are left
    /// as they were.
    pub async fn refresh(&mut self) -> Result<&TokenRecord, AuthError> {
        let refresh_token = self
            .current()
            .ok_or_else(AuthError::no_session)?
            .refresh_token
            .clone()
            .ok_or_else(|| {
                AuthError::PreconditionFailed("Loaded tokens have no refresh token".to_string())
            })?;

        let record = match self.oauth.refresh(&refresh_token).await {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(username = %self.username, error = %err, "refresh failed, keeping current tokens");
                return Err(err);
            }
        };

        // Adopted even when the write below fails.
        let record = &*self.tokens.insert(record);
        self.store.save(&self.username, record)?;
        tracing::info!(username = %self.username, "tokens refreshed");
        Ok(record)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
