//! Query resolution for the scripted handler.
//!
//! Dispatch happens in two phases. Under the state lock the query is
//! normalized, counted and resolved to a `Resolution` following a fixed
//! precedence:
//!
//! 1. exact condition,
//! 2. `kill <id>` command,
//! 3. error patterns in registration order,
//! 4. result patterns in registration order,
//! 5. round-robin list,
//! 6. not found.
//!
//! The lock is then released and the resolution is carried out: callbacks
//! are invoked, delays are waited out, and killed sessions are closed.

mod delay;
mod stream;

use std::sync::Arc;
use std::time::Duration;

use mocksql_types::{QueryResult, SqlError};
use tracing::{debug, error, warn};

use crate::conditions::Outcome;
use crate::errors::DispatchError;
use crate::health::HealthReporter;
use crate::query::{KillCommand, normalize};
use crate::registry::SessionEntry;
use crate::session::{Session, SessionId};
use crate::state::{HandlerState, SharedState};

use self::delay::DelayOutcome;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Callback receiving each piece of a response.
pub type ResponseCallback<'a> =
    dyn FnMut(&QueryResult) -> Result<(), crate::errors::DeliveryError> + 'a;

/// What the locked phase decided to do with a query.
enum Resolution {
    Respond(QueryResult),
    Fail(SqlError),
    Abort,
    Delay {
        result: QueryResult,
        delay: Duration,
        entry: Option<Arc<SessionEntry>>,
    },
    Stream(QueryResult),
    Kill {
        target: Option<Arc<dyn Session>>,
    },
    NotFound,
}

/// Resolves queries against the shared state.
pub(crate) struct Dispatcher<'a> {
    state: &'a SharedState,
    reporter: &'a dyn HealthReporter,
}

impl<'a> Dispatcher<'a> {
    pub(crate) const fn new(state: &'a SharedState, reporter: &'a dyn HealthReporter) -> Self {
        Self { state, reporter }
    }

    /// Dispatches one query issued by `session`.
    pub(crate) fn dispatch(
        &self,
        session: &dyn Session,
        query: &str,
        callback: &mut ResponseCallback<'_>,
    ) -> Result<(), DispatchError> {
        let normalized = normalize(query);
        let session_id = session.id();
        let resolution = self
            .state
            .with_state(|state| resolve(state, session_id, &normalized));
        if let Resolution::Kill {
            target: Some(target),
        } = &resolution
        {
            self.reporter.session_killed(target.id(), session_id);
        }
        execute(resolution, session_id, &normalized, callback)
    }
}

fn resolve(state: &mut HandlerState, session_id: SessionId, query: &str) -> Resolution {
    state.calls.record(query);

    if let Some(condition) = state.conditions.get(query) {
        debug!(
            target: DISPATCH_TARGET,
            session = session_id,
            query,
            kind = %condition.kind(),
            "exact condition matched"
        );
        return match condition.outcome() {
            Outcome::Normal(result) => Resolution::Respond(result.clone()),
            Outcome::Error(error) => Resolution::Fail(error.clone()),
            Outcome::Panic => Resolution::Abort,
            Outcome::Delay(result, delay) => Resolution::Delay {
                result: result.clone(),
                delay: *delay,
                entry: state.sessions.get(session_id),
            },
            Outcome::Stream(result) => Resolution::Stream(result.clone()),
        };
    }

    if let Some(command) = KillCommand::parse(query) {
        let target = match command {
            KillCommand::Session(target_id) => {
                debug!(
                    target: DISPATCH_TARGET,
                    session = session_id,
                    killed_session = target_id,
                    "kill requested"
                );
                state.sessions.kill(target_id)
            }
            KillCommand::Malformed => None,
        };
        return Resolution::Kill { target };
    }

    if let Some(pattern) = state.patterns.first_error(query) {
        debug!(
            target: DISPATCH_TARGET,
            query,
            pattern = pattern.source(),
            "error pattern matched"
        );
        return Resolution::Fail(pattern.outcome().clone());
    }

    if let Some(pattern) = state.patterns.first_result(query) {
        debug!(
            target: DISPATCH_TARGET,
            query,
            pattern = pattern.source(),
            "result pattern matched"
        );
        return Resolution::Respond(pattern.outcome().clone());
    }

    state
        .conditions
        .serve_list(query)
        .map_or(Resolution::NotFound, Resolution::Respond)
}

fn execute(
    resolution: Resolution,
    session_id: SessionId,
    query: &str,
    callback: &mut ResponseCallback<'_>,
) -> Result<(), DispatchError> {
    match resolution {
        Resolution::Respond(result) => deliver(query, &result, callback),
        Resolution::Fail(error) => Err(DispatchError::Injected(error)),
        Resolution::Abort => {
            error!(target: DISPATCH_TARGET, session = session_id, query, "deliberate abort");
            Err(DispatchError::deliberate_abort(query))
        }
        Resolution::Delay {
            result,
            delay,
            entry,
        } => {
            debug!(
                target: DISPATCH_TARGET,
                session = session_id,
                query,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "delaying response"
            );
            match delay::wait(entry.as_deref(), delay) {
                DelayOutcome::Cancelled => {
                    debug!(
                        target: DISPATCH_TARGET,
                        session = session_id,
                        query,
                        "delayed query killed"
                    );
                    Err(DispatchError::killed(session_id, query))
                }
                DelayOutcome::Elapsed => deliver(query, &result, callback),
            }
        }
        Resolution::Stream(result) => stream::emit(query, &result, callback),
        Resolution::Kill { target } => {
            if let Some(session) = target {
                session.close();
            }
            deliver(query, &QueryResult::new(), callback)
        }
        Resolution::NotFound => {
            warn!(
                target: DISPATCH_TARGET,
                session = session_id,
                query,
                "no condition configured"
            );
            Err(DispatchError::condition_not_found(query))
        }
    }
}

fn deliver(
    query: &str,
    result: &QueryResult,
    callback: &mut ResponseCallback<'_>,
) -> Result<(), DispatchError> {
    callback(result).map_err(|source| DispatchError::delivery(query, source))
}
