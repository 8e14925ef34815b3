#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use malcli::auth::{AuthError, OAuthClient, TokenLookup, TokenRecord, TokenStore};

#[derive(Default)]
pub struct InMemoryTokenStore {
    tokens: Mutex<HashMap<String, TokenRecord>>,
    saves: Mutex<usize>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, username: &str, record: TokenRecord) {
        self.tokens
            .lock()
            .expect("store lock poisoned")
            .insert(username.to_string(), record);
    }

    pub fn get(&self, username: &str) -> Option<TokenRecord> {
        self.tokens
            .lock()
            .expect("store lock poisoned")
            .get(username)
            .cloned()
    }

    pub fn save_count(&self) -> usize {
        *self.saves.lock().expect("store lock poisoned")
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self, username: &str) -> Result<TokenLookup, AuthError> {
        Ok(match self.get(username) {
            Some(record) => TokenLookup::Found(record),
            None => TokenLookup::NotFound,
        })
    }

    fn save(&self, username: &str, record: &TokenRecord) -> Result<(), AuthError> {
        *self.saves.lock().expect("store lock poisoned") += 1;
        self.seed(username, record.clone());
        Ok(())
    }
}

/// Store whose writes always fail.
pub struct ReadOnlyTokenStore;

impl TokenStore for ReadOnlyTokenStore {
    fn load(&self, _username: &str) -> Result<TokenLookup, AuthError> {
        Ok(TokenLookup::NotFound)
    }

    fn save(&self, _username: &str, _record: &TokenRecord) -> Result<(), AuthError> {
        Err(AuthError::Io("read-only file system".to_string()))
    }
}

/// OAuth client that replays queued results and records what it was asked.
#[derive(Default)]
pub struct ScriptedOAuthClient {
    exchanges: Mutex<VecDeque<Result<TokenRecord, AuthError>>>,
    refreshes: Mutex<VecDeque<Result<TokenRecord, AuthError>>>,
    calls: Mutex<Vec<Call>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Exchange { verifier: String, code: String },
    Refresh { refresh_token: String },
}

impl ScriptedOAuthClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_exchange(self, result: Result<TokenRecord, AuthError>) -> Self {
        self.exchanges.lock().expect("lock").push_back(result);
        self
    }

    pub fn on_refresh(self, result: Result<TokenRecord, AuthError>) -> Self {
        self.refreshes.lock().expect("lock").push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl OAuthClient for ScriptedOAuthClient {
    fn authorization_url(&self, verifier: &str) -> String {
        format!(
            "https://auth.test/v1/oauth2/authorize?response_type=code&client_id=test&code_challenge={verifier}"
        )
    }

    async fn exchange_code(
        &self,
        verifier: &str,
        auth_code: &str,
    ) -> Result<TokenRecord, AuthError> {
        self.calls.lock().expect("lock").push(Call::Exchange {
            verifier: verifier.to_string(),
            code: auth_code.to_string(),
        });
        self.exchanges
            .lock()
            .expect("lock")
            .pop_front()
            .expect("unexpected exchange_code call")
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenRecord, AuthError> {
        self.calls.lock().expect("lock").push(Call::Refresh {
            refresh_token: refresh_token.to_string(),
        });
        self.refreshes
            .lock()
            .expect("lock")
            .pop_front()
            .expect("unexpected refresh call")
    }
}

pub fn token(access_token: &str, refresh_token: &str) -> TokenRecord {
    TokenRecord::new(access_token)
        .with_refresh_token(refresh_token)
        .with_expires_in(3600)
}
