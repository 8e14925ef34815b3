//! Prompt line grammar: `<command> -<arg1> -<arg2> ...`.

use std::str::FromStr;

use strum::{Display, EnumIter, EnumMessage, EnumString, IntoEnumIterator};

/// Commands accepted at the prompt, with their short aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter, EnumMessage)]
#[strum(ascii_case_insensitive)]
pub enum Command {
    #[strum(to_string = "quit", serialize = "q", serialize = "exit", message = "Quit application")]
    Quit,
    #[strum(to_string = "help", serialize = "-help", serialize = "h", serialize = "?", message = "Show this message")]
    Help,
    #[strum(to_string = "authorize", serialize = "auth", message = "Authorize application")]
    Authorize,
    #[strum(to_string = "load-token", serialize = "ld tkn", message = "Load user's token from data file")]
    LoadToken,
    #[strum(to_string = "refresh-token", serialize = "rf tkn", message = "Refresh the loaded token")]
    RefreshToken,
    #[strum(to_string = "print-token", serialize = "p tkn", message = "Print user's tokens")]
    PrintToken,
    #[strum(
        to_string = "get-info",
        serialize = "gt inf",
        message = "Get user info",
        detailed_message = "[-fields]"
    )]
    GetInfo,
    #[strum(to_string = "get-stats", serialize = "gt stat", message = "Get user's anime stats")]
    GetStats,
    #[strum(
        to_string = "search",
        serialize = "srch",
        message = "Search anime by title",
        detailed_message = "-query [-limit]"
    )]
    Search,
    #[strum(
        to_string = "get-list",
        serialize = "gt lst",
        message = "Get user's anime list",
        detailed_message = "[-status] [-limit]"
    )]
    GetList,
    #[strum(
        to_string = "update-episode",
        serialize = "up ep",
        message = "Set watched episode count",
        detailed_message = "-anime_id -episodes"
    )]
    UpdateEpisode,
}

impl Command {
    /// Resolve a command token; runs of whitespace inside it count as one space.
    pub fn parse(token: &str) -> Option<Self> {
        let normalized = token.split_whitespace().collect::<Vec<_>>().join(" ");
        Self::from_str(&normalized).ok()
    }

    /// Commands that need a loaded session before doing anything else.
    pub fn requires_session(self) -> bool {
        matches!(
            self,
            Self::GetInfo | Self::GetStats | Self::Search | Self::GetList | Self::UpdateEpisode
        )
    }

    pub fn usage(self) -> String {
        match self.get_detailed_message() {
            Some(args) => format!("{self} {args}"),
            None => self.to_string(),
        }
    }

    fn aliases(self) -> Vec<&'static str> {
        let canonical = self.to_string();
        let mut aliases: Vec<_> = self
            .get_serializations()
            .iter()
            .copied()
            .filter(|name| *name != canonical)
            .collect();
        aliases.sort_unstable();
        aliases
    }
}

/// One input line split into its command token and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    pub command: &'a str,
    pub args: Vec<&'a str>,
}

/// Split a line on `" -"`. The first piece is the command (it may contain
/// spaces, as in `ld tkn`); later pieces are arguments. Blank lines give `None`.
pub fn parse_line(line: &str) -> Option<ParsedLine<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let mut pieces = line.split(" -");
    let command = pieces.next().unwrap_or_default().trim();
    let args = pieces.map(str::trim).filter(|arg| !arg.is_empty()).collect();
    Some(ParsedLine { command, args })
}

/// The table printed by `help`.
pub fn help_text() -> String {
    let rows: Vec<(String, String, &str)> = Command::iter()
        .map(|cmd| {
            (
                cmd.usage(),
                cmd.aliases().join(", "),
                cmd.get_message().unwrap_or_default(),
            )
        })
        .collect();
    let usage_width = rows.iter().map(|(u, _, _)| u.len()).max().unwrap_or(0);
    let alias_width = rows.iter().map(|(_, a, _)| a.len()).max().unwrap_or(0);

    let mut out = format!(
        "{:<usage_width$}  {:<alias_width$}  Description\n",
        "Command", "Aliases"
    );
    for (usage, aliases, description) in rows {
        out.push_str(&format!(
            "{usage:<usage_width$}  {aliases:<alias_width$}  {description}\n"
        ));
    }
    out
}
