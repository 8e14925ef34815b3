use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// OAuth token payload as returned by the authorization server.
///
/// Fields this client does not interpret are kept in `extra` and written
/// back to the token file unchanged.
///
/// # Example
/// ```
/// use malcli::auth::TokenRecord;
///
/// let record: TokenRecord = serde_json::from_str(
///     r#"{"access_token":"AT1","refresh_token":"RT1","expires_in":3600,"scope":"read"}"#,
/// )?;
/// assert_eq!(record.access_token, "AT1");
/// assert_eq!(record.extra["scope"], "read");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenRecord {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_in: None,
            token_type: None,
            extra: Map::new(),
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_expires_in(mut self, seconds: i64) -> Self {
        self.expires_in = Some(seconds);
        self
    }

    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }
}
