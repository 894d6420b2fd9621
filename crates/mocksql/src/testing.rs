//! Recording doubles for sessions and response callbacks.
//!
//! Available to this crate's tests and, through the `test-support` feature,
//! to downstream suites that drive a [`crate::ScriptedHandler`] directly.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use mocksql_config::DEFAULT_ACCEPTED_USER;
use mocksql_types::QueryResult;

use crate::errors::DeliveryError;
use crate::session::{Session, SessionId};

/// Session double that records how often it was closed.
#[derive(Debug)]
pub struct RecordingSession {
    id: SessionId,
    user: String,
    closes: AtomicUsize,
}

impl RecordingSession {
    /// Creates a session authenticated as the default accepted user.
    #[must_use]
    pub fn new(id: SessionId) -> Arc<Self> {
        Self::with_user(id, DEFAULT_ACCEPTED_USER)
    }

    /// Creates a session authenticated as `user`.
    #[must_use]
    pub fn with_user(id: SessionId, user: &str) -> Arc<Self> {
        Arc::new(Self {
            id,
            user: user.to_owned(),
            closes: AtomicUsize::new(0),
        })
    }

    /// Number of times [`Session::close`] was called.
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Returns true once the session has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.close_count() > 0
    }
}

impl Session for RecordingSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn user(&self) -> String {
        self.user.clone()
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Collects every result handed to a response callback.
#[derive(Debug, Default)]
pub struct ResponseLog {
    responses: Vec<QueryResult>,
    fail_at: Option<usize>,
}

impl ResponseLog {
    /// Creates a log whose callback always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log whose callback records, then rejects, the invocation
    /// at zero-based position `index`.
    #[must_use]
    pub fn failing_at(index: usize) -> Self {
        Self {
            responses: Vec::new(),
            fail_at: Some(index),
        }
    }

    /// Returns a callback that appends to this log.
    pub fn sink(&mut self) -> impl FnMut(&QueryResult) -> Result<(), DeliveryError> + '_ {
        move |result| {
            let position = self.responses.len();
            self.responses.push(result.clone());
            if self.fail_at == Some(position) {
                return Err(DeliveryError::rejected(format!(
                    "callback rejected invocation {position}"
                )));
            }
            Ok(())
        }
    }

    /// Results received so far, in order.
    #[must_use]
    pub fn responses(&self) -> &[QueryResult] {
        &self.responses
    }

    /// Number of callback invocations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.responses.len()
    }

    /// Returns true when the callback was never invoked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}
