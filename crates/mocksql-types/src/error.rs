use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A MySQL-style error packet: numeric code, SQL state and message.
///
/// Scripted handlers hand out clones of the same value every time a
/// configured error fires, so the type is cheap to clone and compare.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message} (errno {code}) (sqlstate {state})")]
pub struct SqlError {
    code: u16,
    state: String,
    message: String,
}

impl SqlError {
    /// Access denied for the connecting user.
    pub const ER_ACCESS_DENIED_ERROR: u16 = 1045;
    /// Unknown database.
    pub const ER_BAD_DB_ERROR: u16 = 1049;
    /// Generic server-side failure.
    pub const ER_UNKNOWN_ERROR: u16 = 1105;
    /// Statement was interrupted by a kill.
    pub const ER_QUERY_INTERRUPTED: u16 = 1317;

    /// Creates an error with the SQL state conventionally paired with `code`.
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            state: default_state(code).to_owned(),
            message: message.into(),
        }
    }

    /// Overrides the SQL state.
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// Numeric error code.
    #[must_use]
    pub const fn code(&self) -> u16 {
        self.code
    }

    /// Five-character SQL state.
    #[must_use]
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

const fn default_state(code: u16) -> &'static str {
    match code {
        SqlError::ER_ACCESS_DENIED_ERROR => "28000",
        SqlError::ER_BAD_DB_ERROR => "42000",
        SqlError::ER_QUERY_INTERRUPTED => "70100",
        _ => "HY000",
    }
}
