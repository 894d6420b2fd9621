//! Query text normalization and the `kill <id>` command form.

use crate::session::SessionId;

/// Case-folds query text. Every key stored or looked up goes through here.
#[must_use]
pub fn normalize(query: &str) -> String {
    query.to_lowercase()
}

/// A recognised `kill` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KillCommand {
    /// `kill <id>` with a valid session id.
    Session(SessionId),
    /// `kill` followed by something that is not a session id.
    Malformed,
}

impl KillCommand {
    /// Parses a normalized query. Returns `None` unless the first token is
    /// exactly `kill`.
    pub(crate) fn parse(query: &str) -> Option<Self> {
        let mut tokens = query.split_whitespace();
        if tokens.next() != Some("kill") {
            return None;
        }
        let command = tokens
            .next()
            .and_then(|token| token.parse::<SessionId>().ok())
            .map_or(Self::Malformed, Self::Session);
        Some(command)
    }
}
