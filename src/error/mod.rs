//! Error types for malcli.

use thiserror::Error;

use crate::auth::AuthError;

/// Primary error type for commands run from the prompt.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Command not recognized!")]
    UnknownCommand(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }

    /// Whether the interactive loop must stop after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Auth(err) if err.is_fatal())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(error.to_string())
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ClientError>;
