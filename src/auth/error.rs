use thiserror::Error;

/// Failures of the authorization and session subsystem.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Secure random source unavailable: {0}")]
    SecretGenerationFailed(String),
    #[error("Authorization code exchange failed (status {status}): {body}")]
    AuthExchangeFailed { status: u16, body: String },
    #[error("Token refresh failed (status {status}): {body}")]
    RefreshFailed { status: u16, body: String },
    #[error("Request to the authorization server timed out")]
    NetworkTimeout,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("No tokens found for {username}")]
    TokenNotFound { username: String },
    #[error("{0}")]
    PreconditionFailed(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AuthError {
    /// Only an unusable entropy source ends the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::SecretGenerationFailed(_))
    }

    pub(crate) fn no_session() -> Self {
        Self::PreconditionFailed(
            "Token not loaded. Run `load-token` or `authorize` first".to_string(),
        )
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::NetworkTimeout
        } else {
            Self::Network(error.to_string())
        }
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}
