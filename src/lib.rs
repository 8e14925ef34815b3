//! malcli: interactive MyAnimeList client.
//!
//! Runs the OAuth2 authorization-code flow, keeps per-user tokens in a local
//! JSON file, refreshes them, and issues authenticated API calls from a
//! single-line prompt.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use malcli::api::MalApi;
//! use malcli::auth::{FileTokenStore, MalOAuthClient, Session};
//! use malcli::cli::Repl;
//! use malcli::config::MalConfig;
//!
//! # async fn example() -> malcli::error::Result<()> {
//! let config = MalConfig::from_env();
//! let session = Session::new(
//!     "alice",
//!     Arc::new(FileTokenStore::new(&config.token_file)),
//!     Arc::new(MalOAuthClient::new(&config)?),
//! );
//! let api = MalApi::new(&config)?;
//! let stdin = std::io::stdin();
//! Repl::new(session, api, stdin.lock(), std::io::stdout()).run().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
