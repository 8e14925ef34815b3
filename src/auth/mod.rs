//! OAuth authorization-code flow, token storage, and the per-run session.

pub mod error;
pub mod oauth;
pub mod session;
pub mod store;
pub mod token;
pub mod verifier;

pub use error::AuthError;
pub use oauth::{build_authorization_url, MalOAuthClient, OAuthClient};
pub use session::{PendingAuthorization, Session, SessionState};
pub use store::{FileTokenStore, TokenLookup, TokenStore};
pub use token::TokenRecord;
pub use verifier::{generate_verifier, VerifierSource, VERIFIER_LEN};
