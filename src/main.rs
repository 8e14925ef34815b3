//! malcli binary entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use malcli::api::MalApi;
use malcli::auth::{FileTokenStore, MalOAuthClient, Session};
use malcli::cli::{prompt_username, Cli, Repl};
use malcli::config::MalConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Logs go to stderr so they never interleave with prompt output.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(cli: Cli) -> malcli::error::Result<()> {
    let config = cli.apply(MalConfig::from_env());
    tracing::debug!(token_file = %config.token_file.display(), "configuration loaded");

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();

    let username = match cli.username {
        Some(name) => name,
        None => prompt_username(&mut input, &mut output)?,
    };

    let session = Session::new(
        username,
        Arc::new(FileTokenStore::new(&config.token_file)),
        Arc::new(MalOAuthClient::new(&config)?),
    );
    let api = MalApi::new(&config)?;

    Repl::new(session, api, input, output).run().await
}
