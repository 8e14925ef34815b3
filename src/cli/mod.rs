//! CLI entry point for malcli.

pub mod command;
pub mod repl;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Parser;

use crate::config::MalConfig;
use crate::error::{ClientError, Result};

pub use command::{help_text, parse_line, Command, ParsedLine};
pub use repl::{Flow, Repl};

/// Interactive MyAnimeList client
#[derive(Parser, Debug)]
#[command(name = "malcli", version, about = "Interactive MyAnimeList client")]
pub struct Cli {
    /// Account whose tokens are loaded and saved (prompted for when omitted)
    #[arg(short, long)]
    pub username: Option<String>,

    /// Token file (default: mal_tokens.json, or MAL_TOKEN_FILE)
    #[arg(long)]
    pub token_file: Option<PathBuf>,

    /// OAuth client id (default: built-in, or MAL_CLIENT_ID)
    #[arg(long)]
    pub client_id: Option<String>,
}

impl Cli {
    /// Layer explicit flags over an env-derived config.
    pub fn apply(&self, mut config: MalConfig) -> MalConfig {
        if let Some(path) = &self.token_file {
            config = config.with_token_file(path.clone());
        }
        if let Some(client_id) = &self.client_id {
            config = config.with_client_id(client_id.clone());
        }
        config
    }
}

/// Ask for the username until a non-blank one is entered.
pub fn prompt_username(input: &mut impl BufRead, output: &mut impl Write) -> Result<String> {
    loop {
        write!(output, "Enter your username: ")?;
        output.flush()?;
        let mut buf = String::new();
        if input.read_line(&mut buf)? == 0 {
            return Err(ClientError::InvalidArgument("no username given".to_string()));
        }
        let name = buf.trim();
        if !name.is_empty() {
            return Ok(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parse_without_flags() {
        let cli = Cli::try_parse_from(["malcli"]).unwrap();
        assert!(cli.username.is_none());
        assert_eq!(cli.apply(MalConfig::default()), MalConfig::default());
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::try_parse_from([
            "malcli",
            "-u",
            "alice",
            "--token-file",
            "/tmp/t.json",
            "--client-id",
            "cid",
        ])
        .unwrap();
        assert_eq!(cli.username.as_deref(), Some("alice"));
        let config = cli.apply(MalConfig::default());
        assert_eq!(config.token_file, PathBuf::from("/tmp/t.json"));
        assert_eq!(config.client_id, "cid");
    }

    #[test]
    fn prompt_username_skips_blank_lines() {
        let mut input = Cursor::new("\n   \n alice \n");
        let mut output = Vec::new();
        let name = prompt_username(&mut input, &mut output).unwrap();
        assert_eq!(name, "alice");
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("Enter your username: ").count(), 3);
    }

    #[test]
    fn prompt_username_fails_on_end_of_input() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        assert!(matches!(
            prompt_username(&mut input, &mut output),
            Err(ClientError::InvalidArgument(_))
        ));
    }
}
