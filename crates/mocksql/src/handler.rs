//! The handler contract a server drives, and its scripted implementation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use mocksql_config::Config;
use mocksql_types::{QueryResult, SqlError};
use tracing::debug;

use crate::conditions::{Condition, ConditionList};
use crate::dispatch::{DISPATCH_TARGET, Dispatcher, ResponseCallback};
use crate::errors::{DispatchError, SetupError};
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::patterns::PatternEntry;
use crate::query::normalize;
use crate::session::{Session, SessionId};
use crate::state::SharedState;

/// Hooks a protocol server invokes over the lifetime of a connection.
pub trait QueryHandler: Send + Sync {
    /// Invoked when a connection is accepted, before authentication.
    ///
    /// # Errors
    ///
    /// Returns an error to refuse the connection.
    fn session_check(&self, session: &dyn Session) -> Result<(), DispatchError>;

    /// Invoked once the client has sent its credentials.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::AccessDenied`] for rejected users.
    fn auth_check(&self, session: &dyn Session) -> Result<(), DispatchError>;

    /// Invoked when the client selects a database.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::SchemaRejected`] for rejected names.
    fn init_db(&self, session: &dyn Session, database: &str) -> Result<(), DispatchError>;

    /// Invoked after a session is established.
    fn new_session(&self, session: Arc<dyn Session>);

    /// Invoked after a session is closed.
    fn session_closed(&self, session: &dyn Session);

    /// Answers one query by invoking `callback` zero or more times.
    ///
    /// # Errors
    ///
    /// Returns the [`DispatchError`] configured or implied for the query.
    fn com_query(
        &self,
        session: &dyn Session,
        query: &str,
        callback: &mut ResponseCallback<'_>,
    ) -> Result<(), DispatchError>;
}

impl<T> QueryHandler for Arc<T>
where
    T: QueryHandler + ?Sized,
{
    fn session_check(&self, session: &dyn Session) -> Result<(), DispatchError> {
        (**self).session_check(session)
    }

    fn auth_check(&self, session: &dyn Session) -> Result<(), DispatchError> {
        (**self).auth_check(session)
    }

    fn init_db(&self, session: &dyn Session, database: &str) -> Result<(), DispatchError> {
        (**self).init_db(session, database)
    }

    fn new_session(&self, session: Arc<dyn Session>) {
        (**self).new_session(session);
    }

    fn session_closed(&self, session: &dyn Session) {
        (**self).session_closed(session);
    }

    fn com_query(
        &self,
        session: &dyn Session,
        query: &str,
        callback: &mut ResponseCallback<'_>,
    ) -> Result<(), DispatchError> {
        (**self).com_query(session, query, callback)
    }
}

/// Handler that answers queries from registered conditions and patterns.
///
/// Clones share the same tables, so a test can keep one clone for setup and
/// assertions while a server drives another.
///
/// # Example
///
/// ```
/// use mocksql::{QueryHandler, ScriptedHandler, Session, SessionId};
/// use mocksql_types::QueryResult;
///
/// struct Client;
///
/// impl Session for Client {
///     fn id(&self) -> SessionId {
///         1
///     }
///     fn user(&self) -> String {
///         "mock".to_owned()
///     }
///     fn close(&self) {}
/// }
///
/// let handler = ScriptedHandler::default();
/// handler.add_query("SELECT 1", QueryResult::new().with_rows_affected(1));
///
/// let mut received = Vec::new();
/// handler
///     .com_query(&Client, "select 1", &mut |result: &QueryResult| {
///         received.push(result.clone());
///         Ok::<(), mocksql::DeliveryError>(())
///     })
///     .expect("configured query succeeds");
/// assert_eq!(received.len(), 1);
/// assert_eq!(handler.query_called("Select 1"), 1);
/// ```
#[derive(Clone)]
pub struct ScriptedHandler {
    config: Arc<Config>,
    state: SharedState,
    reporter: Arc<dyn HealthReporter>,
}

impl ScriptedHandler {
    /// Creates a handler with no conditions configured that reports
    /// session events through [`StructuredHealthReporter`].
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_reporter(config, Arc::new(StructuredHealthReporter::new()))
    }

    /// Creates a handler that reports session events to `reporter`.
    #[must_use]
    pub fn with_reporter(config: Config, reporter: Arc<dyn HealthReporter>) -> Self {
        Self {
            config: Arc::new(config),
            state: SharedState::default(),
            reporter,
        }
    }

    /// Configuration governing the connection checks.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn set_condition(&self, condition: Condition) {
        self.state.with_state(|state| {
            state.calls.reset(condition.query());
            state.conditions.install(condition);
        });
    }

    /// Answers `query` with `result`.
    pub fn add_query(&self, query: &str, result: QueryResult) {
        self.set_condition(Condition::normal(query, result));
    }

    /// Answers `query` with `result` after `delay`, unless the session is
    /// killed first.
    pub fn add_query_delay(&self, query: &str, result: QueryResult, delay: Duration) {
        self.set_condition(Condition::delayed(query, result, delay));
    }

    /// Answers `query` by streaming `result` as fields, rows and a terminal
    /// marker.
    pub fn add_query_stream(&self, query: &str, result: QueryResult) {
        self.set_condition(Condition::stream(query, result));
    }

    /// Fails `query` with `error`.
    pub fn add_query_error(&self, query: &str, error: SqlError) {
        self.set_condition(Condition::error(query, error));
    }

    /// Makes `query` fail with [`DispatchError::DeliberateAbort`].
    pub fn add_query_panic(&self, query: &str) {
        self.set_condition(Condition::panic(query));
    }

    /// Answers `query` with `results` in turn, wrapping after the last.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::EmptySequence`] if `results` is empty.
    pub fn add_queries(&self, query: &str, results: Vec<QueryResult>) -> Result<(), SetupError> {
        let key = normalize(query);
        let list = ConditionList::new(results).ok_or_else(|| SetupError::empty_sequence(&key))?;
        self.state.with_state(|state| {
            state.calls.reset(&key);
            state.conditions.install_list(key, list);
        });
        Ok(())
    }

    /// Answers every query matching `pattern` with `result`.
    ///
    /// The pattern is anchored at both ends and matched case-insensitively.
    /// Patterns are consulted only when no exact condition exists, in
    /// registration order.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::MissingFields`] if `result` has rows but no
    /// fields, or [`SetupError::InvalidPattern`] if the pattern does not
    /// compile. Nothing is registered on error.
    pub fn add_query_pattern(&self, pattern: &str, result: QueryResult) -> Result<(), SetupError> {
        let entry = PatternEntry::result(pattern, result)?;
        self.state
            .with_state(|state| state.patterns.push_result(entry));
        Ok(())
    }

    /// Fails every query matching `pattern` with `error`.
    ///
    /// Error patterns take precedence over result patterns.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidPattern`] if the pattern does not
    /// compile. Nothing is registered on error.
    pub fn add_query_error_pattern(
        &self,
        pattern: &str,
        error: SqlError,
    ) -> Result<(), SetupError> {
        let entry = PatternEntry::error(pattern, error)?;
        self.state
            .with_state(|state| state.patterns.push_error(entry));
        Ok(())
    }

    /// Removes every condition, round-robin list and pattern. Call counts
    /// and sessions are kept.
    pub fn reset_all(&self) {
        self.state.with_state(|state| {
            state.conditions.clear();
            state.patterns.clear();
        });
    }

    /// Removes error patterns only.
    pub fn reset_pattern_errors(&self) {
        self.state
            .with_state(|state| state.patterns.clear_errors());
    }

    /// Removes exact error conditions only.
    pub fn reset_errors(&self) {
        self.state
            .with_state(|state| state.conditions.clear_errors());
    }

    /// Number of times `query` was dispatched since its condition was last
    /// installed.
    #[must_use]
    pub fn query_called(&self, query: &str) -> u64 {
        let key = normalize(query);
        self.state.with_state(|state| state.calls.get(&key))
    }

    /// Number of registered sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.state.with_state(|state| state.sessions.len())
    }

    /// Returns true when a session with `id` is registered.
    #[must_use]
    pub fn has_session(&self, id: SessionId) -> bool {
        self.state.with_state(|state| state.sessions.contains(id))
    }
}

impl Default for ScriptedHandler {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl fmt::Debug for ScriptedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedHandler")
            .field("config", &self.config)
            .field("sessions", &self.session_count())
            .finish_non_exhaustive()
    }
}

impl QueryHandler for ScriptedHandler {
    fn session_check(&self, _session: &dyn Session) -> Result<(), DispatchError> {
        Ok(())
    }

    fn auth_check(&self, session: &dyn Session) -> Result<(), DispatchError> {
        let user = session.user();
        if user != self.config.accepted_user() {
            debug!(
                target: DISPATCH_TARGET,
                session = session.id(),
                user = %user,
                "access denied"
            );
            return Err(DispatchError::access_denied(user));
        }
        Ok(())
    }

    fn init_db(&self, session: &dyn Session, database: &str) -> Result<(), DispatchError> {
        if database.starts_with(self.config.reserved_schema_prefix()) {
            debug!(
                target: DISPATCH_TARGET,
                session = session.id(),
                database,
                "database rejected"
            );
            return Err(DispatchError::schema_rejected(database));
        }
        Ok(())
    }

    fn new_session(&self, session: Arc<dyn Session>) {
        let id = session.id();
        let live = self.state.with_state(|state| {
            state.sessions.register(session);
            state.sessions.len()
        });
        self.reporter.session_opened(id, live);
    }

    fn session_closed(&self, session: &dyn Session) {
        let id = session.id();
        let (removed, live) = self.state.with_state(|state| {
            let removed = state.sessions.unregister(id).is_some();
            (removed, state.sessions.len())
        });
        if removed {
            self.reporter.session_closed(id, live);
        }
    }

    fn com_query(
        &self,
        session: &dyn Session,
        query: &str,
        callback: &mut ResponseCallback<'_>,
    ) -> Result<(), DispatchError> {
        Dispatcher::new(&self.state, self.reporter.as_ref()).dispatch(session, query, callback)
    }
}
