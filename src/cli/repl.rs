//! Read-dispatch-print loop.

use std::io::{BufRead, Write};

use crate::api::{ApiResponse, MalApi};
use crate::auth::{AuthError, Session};
use crate::error::{ClientError, Result};

use super::command::{help_text, parse_line, Command};

const PROMPT: &str = "\n--> ";

/// What the loop should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive dispatcher owning the session for one run.
///
/// Each line is handled to completion before the next prompt. A failing
/// command is reported as one line and the loop goes on; only `quit`, end of
/// input, or an unusable entropy source ends it.
pub struct Repl<R, W> {
    session: Session,
    api: MalApi,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    pub fn new(session: Session, api: MalApi, input: R, output: W) -> Self {
        Self {
            session,
            api,
            input,
            output,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub async fn run(&mut self) -> Result<()> {
        loop {
            write!(self.output, "{PROMPT}")?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                tracing::debug!("end of input");
                writeln!(self.output)?;
                return Ok(());
            };
            match self.execute(&line).await {
                Ok(Flow::Quit) => return Ok(()),
                Ok(Flow::Continue) => {}
                Err(err) => {
                    self.report(&err)?;
                    if err.is_fatal() {
                        return Err(err);
                    }
                }
            }
        }
    }

    /// Run a single input line.
    pub async fn execute(&mut self, line: &str) -> Result<Flow> {
        let Some(parsed) = parse_line(line) else {
            return Ok(Flow::Continue);
        };
        let command = Command::parse(parsed.command)
            .ok_or_else(|| ClientError::UnknownCommand(parsed.command.to_string()))?;
        tracing::debug!(%command, args = parsed.args.len(), "dispatch");

        if command.requires_session() && !self.session.is_loaded() {
            return Err(AuthError::no_session().into());
        }

        let args = parsed.args;
        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => write!(self.output, "{}", help_text())?,
            Command::Authorize => self.authorize().await?,
            Command::LoadToken => {
                self.session.load()?;
                writeln!(self.output, "Token loaded.")?;
            }
            Command::RefreshToken => {
                self.session.refresh().await?;
                writeln!(self.output, "Token refreshed.")?;
            }
            Command::PrintToken => self.print_token()?,
            Command::GetInfo => {
                let token = self.session.access_token()?;
                let resp = self.api.user_info(token, args.first().copied()).await?;
                self.print_response(&resp)?;
            }
            Command::GetStats => {
                let token = self.session.access_token()?;
                let resp = self.api.anime_statistics(token).await?;
                self.print_response(&resp)?;
            }
            Command::Search => {
                let query = required(&args, 0, command)?;
                let limit = optional_number::<u32>(&args, 1, "limit")?;
                let token = self.session.access_token()?;
                let resp = self.api.search_anime(token, query, limit).await?;
                self.print_response(&resp)?;
            }
            Command::GetList => {
                let status = args.first().copied();
                let limit = optional_number::<u32>(&args, 1, "limit")?;
                let token = self.session.access_token()?;
                let resp = self.api.anime_list(token, status, limit).await?;
                self.print_response(&resp)?;
            }
            Command::UpdateEpisode => {
                let anime_id = number::<u64>(required(&args, 0, command)?, "anime_id")?;
                let episodes = number::<u32>(required(&args, 1, command)?, "episodes")?;
                let token = self.session.access_token()?;
                let resp = self
                    .api
                    .update_watched_episodes(token, anime_id, episodes)
                    .await?;
                self.print_response(&resp)?;
            }
        }
        Ok(Flow::Continue)
    }

    async fn authorize(&mut self) -> Result<()> {
        let pending = self.session.start_authorization()?;
        writeln!(
            self.output,
            "Authorize application by going to the following link: \n{}\n",
            pending.authorize_url()
        )?;
        write!(self.output, "Copy-Paste the code here: ")?;
        self.output.flush()?;
        let code = self.read_line()?.unwrap_or_default();
        self.session.complete_authorization(pending, &code).await?;
        writeln!(self.output, "Authorized.")?;
        Ok(())
    }

    fn print_token(&mut self) -> Result<()> {
        match self.session.current() {
            Some(record) => {
                let pretty = serde_json::to_string_pretty(record)?;
                writeln!(self.output, "{pretty}")?;
            }
            None => writeln!(self.output, "Token not loaded.")?,
        }
        Ok(())
    }

    fn print_response(&mut self, resp: &ApiResponse) -> Result<()> {
        writeln!(self.output, "<Response [{}]>", resp.status)?;
        writeln!(self.output, "{}", serde_json::to_string_pretty(&resp.body)?)?;
        Ok(())
    }

    fn report(&mut self, err: &ClientError) -> Result<()> {
        match err {
            ClientError::UnknownCommand(input) => {
                tracing::debug!(%input, "unrecognized command");
                writeln!(self.output, "{err}")?;
            }
            ClientError::Auth(AuthError::TokenNotFound { .. }) => {
                writeln!(self.output, "{err}.")?;
            }
            _ => {
                tracing::debug!(error = ?err, "command failed");
                writeln!(self.output, "Error: {err}")?;
            }
        }
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim().to_string()))
    }
}

fn required<'a>(args: &[&'a str], index: usize, command: Command) -> Result<&'a str> {
    args.get(index)
        .copied()
        .ok_or_else(|| ClientError::InvalidArgument(format!("usage: {}", command.usage())))
}

fn number<T: std::str::FromStr>(raw: &str, name: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| ClientError::InvalidArgument(format!("{name} must be a number, got {raw:?}")))
}

fn optional_number<T: std::str::FromStr>(args: &[&str], index: usize, name: &str) -> Result<Option<T>> {
    args.get(index).map(|raw| number(raw, name)).transpose()
}
