//! Error types for handler setup and query dispatch.
//!
//! Setup errors are raised while a test registers conditions and patterns;
//! they never reach dispatch. Dispatch errors are returned to the caller of
//! the current query only. Each dispatch error maps onto a MySQL error code
//! so a server can encode it as an error packet.

use std::io;
use std::sync::Arc;

use mocksql_types::{ResultState, SqlError};
use thiserror::Error;

use crate::session::SessionId;

/// Failure reported by a response callback while emitting a result.
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    /// Writing the response to the client failed.
    #[error("response write failed: {0}")]
    Io(#[source] Arc<io::Error>),
    /// The consumer refused the response.
    #[error("response rejected: {message}")]
    Rejected {
        /// Reason given by the consumer.
        message: String,
    },
}

impl DeliveryError {
    /// Creates a rejection with the given reason.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

impl From<io::Error> for DeliveryError {
    fn from(error: io::Error) -> Self {
        Self::Io(Arc::new(error))
    }
}

/// Errors raised while registering conditions or patterns.
///
/// A registration that fails leaves the handler untouched.
#[derive(Debug, Error)]
pub enum SetupError {
    /// A pattern result has rows but no field metadata.
    #[error("result for pattern '{pattern}' has rows but no fields; add fields so it is valid")]
    MissingFields {
        /// Pattern text as registered.
        pattern: String,
    },

    /// A pattern is not a valid regular expression.
    #[error("invalid query pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Pattern text as registered.
        pattern: String,
        /// Underlying compile error.
        #[source]
        source: regex::Error,
    },

    /// A round-robin sequence was registered without any results.
    #[error("round-robin sequence for '{query}' has no results")]
    EmptySequence {
        /// Normalized query.
        query: String,
    },
}

impl SetupError {
    /// Creates a missing-fields error.
    pub fn missing_fields(pattern: impl Into<String>) -> Self {
        Self::MissingFields {
            pattern: pattern.into(),
        }
    }

    /// Creates an invalid-pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            source,
        }
    }

    /// Creates an empty-sequence error.
    pub fn empty_sequence(query: impl Into<String>) -> Self {
        Self::EmptySequence {
            query: query.into(),
        }
    }
}

/// Errors surfaced by connection checks and query dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The connecting user is not the accepted identity.
    #[error("access denied for user '{user}'")]
    AccessDenied {
        /// Rejected user name.
        user: String,
    },

    /// The selected database name carries the reserved prefix.
    #[error("unknown database '{database}'")]
    SchemaRejected {
        /// Rejected database name.
        database: String,
    },

    /// Nothing configured matches the query.
    #[error("no condition configured for query '{query}'; register one first")]
    ConditionNotFound {
        /// Normalized query.
        query: String,
    },

    /// An error configured for the query.
    #[error(transparent)]
    Injected(SqlError),

    /// A kill from another session interrupted a delayed query.
    #[error("session {session} query '{query}' was killed")]
    KilledDuringDelay {
        /// Session whose query was interrupted.
        session: SessionId,
        /// Normalized query.
        query: String,
    },

    /// A callback failed part way through a streamed result.
    #[error("failed to stream {phase} for query '{query}': {source}")]
    StreamEmission {
        /// Normalized query.
        query: String,
        /// Piece of the stream that failed.
        phase: ResultState,
        /// Callback failure.
        #[source]
        source: DeliveryError,
    },

    /// A callback failed while receiving a single result.
    #[error("failed to deliver result for query '{query}': {source}")]
    Delivery {
        /// Normalized query.
        query: String,
        /// Callback failure.
        #[source]
        source: DeliveryError,
    },

    /// The query was configured to abort the session outright.
    ///
    /// This is a deliberate fatal test condition. The handler never panics
    /// on it; callers decide whether to escalate.
    #[error("deliberate abort configured for query '{query}'")]
    DeliberateAbort {
        /// Normalized query.
        query: String,
    },
}

impl DispatchError {
    /// Returns the MySQL error code a server should report.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::AccessDenied { .. } => SqlError::ER_ACCESS_DENIED_ERROR,
            Self::SchemaRejected { .. } => SqlError::ER_BAD_DB_ERROR,
            Self::Injected(error) => error.code(),
            Self::KilledDuringDelay { .. } => SqlError::ER_QUERY_INTERRUPTED,
            Self::ConditionNotFound { .. }
            | Self::StreamEmission { .. }
            | Self::Delivery { .. }
            | Self::DeliberateAbort { .. } => SqlError::ER_UNKNOWN_ERROR,
        }
    }

    /// Returns true for errors that represent an intentional fatal
    /// condition rather than a recoverable failure.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::DeliberateAbort { .. })
    }

    /// Converts the error into the packet a server would send.
    #[must_use]
    pub fn to_sql_error(&self) -> SqlError {
        match self {
            Self::Injected(error) => error.clone(),
            other => SqlError::new(other.code(), other.to_string()),
        }
    }

    /// Creates an access-denied error.
    pub fn access_denied(user: impl Into<String>) -> Self {
        Self::AccessDenied { user: user.into() }
    }

    /// Creates a schema-rejected error.
    pub fn schema_rejected(database: impl Into<String>) -> Self {
        Self::SchemaRejected {
            database: database.into(),
        }
    }

    /// Creates a condition-not-found error.
    pub fn condition_not_found(query: impl Into<String>) -> Self {
        Self::ConditionNotFound {
            query: query.into(),
        }
    }

    /// Creates a killed-during-delay error.
    pub fn killed(session: SessionId, query: impl Into<String>) -> Self {
        Self::KilledDuringDelay {
            session,
            query: query.into(),
        }
    }

    /// Creates a stream emission error.
    pub fn stream_emission(
        query: impl Into<String>,
        phase: ResultState,
        source: DeliveryError,
    ) -> Self {
        Self::StreamEmission {
            query: query.into(),
            phase,
            source,
        }
    }

    /// Creates a delivery error.
    pub fn delivery(query: impl Into<String>, source: DeliveryError) -> Self {
        Self::Delivery {
            query: query.into(),
            source,
        }
    }

    /// Creates a deliberate-abort error.
    pub fn deliberate_abort(query: impl Into<String>) -> Self {
        Self::DeliberateAbort {
            query: query.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::access(DispatchError::access_denied("bob"), 1045)]
    #[case::schema(DispatchError::schema_rejected("xxdb"), 1049)]
    #[case::killed(DispatchError::killed(3, "select sleep(5)"), 1317)]
    #[case::not_found(DispatchError::condition_not_found("select 1"), 1105)]
    #[case::abort(DispatchError::deliberate_abort("select 1"), 1105)]
    #[case::injected(DispatchError::Injected(SqlError::new(1062, "dup")), 1062)]
    fn maps_to_mysql_codes(#[case] error: DispatchError, #[case] code: u16) {
        assert_eq!(error.code(), code);
        assert_eq!(error.to_sql_error().code(), code);
    }

    #[test]
    fn only_deliberate_abort_is_fatal() {
        assert!(DispatchError::deliberate_abort("q").is_fatal());
        assert!(!DispatchError::condition_not_found("q").is_fatal());
        assert!(!DispatchError::killed(1, "q").is_fatal());
    }

    #[test]
    fn injected_error_is_returned_verbatim() {
        let configured = SqlError::new(1213, "deadlock found").with_state("40001");
        let error = DispatchError::Injected(configured.clone());
        assert_eq!(error.to_sql_error(), configured);
        assert_eq!(error.to_string(), configured.to_string());
    }

    #[test]
    fn stream_error_names_phase_and_query() {
        let error = DispatchError::stream_emission(
            "select * from t",
            ResultState::Rows,
            DeliveryError::rejected("client gone"),
        );
        let message = error.to_string();
        assert!(message.contains("rows"), "got {message}");
        assert!(message.contains("select * from t"), "got {message}");
        assert!(message.contains("client gone"), "got {message}");
    }

    #[test]
    fn io_errors_convert_into_delivery_errors() {
        let error = DeliveryError::from(io::Error::new(io::ErrorKind::BrokenPipe, "pipe"));
        assert!(matches!(error, DeliveryError::Io(_)));
    }
}
