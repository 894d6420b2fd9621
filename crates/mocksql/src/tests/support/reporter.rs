//! Test double for [`HealthReporter`] that records lifecycle events.

use std::sync::Mutex;

use mocksql_config::Config;

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;
use crate::session::SessionId;

/// Lifecycle events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// A handler was built for the named accepted user.
    HandlerReady { accepted_user: String },
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// A session was registered, leaving `live` sessions.
    SessionOpened { session: SessionId, live: usize },
    /// A session was unregistered, leaving `live` sessions.
    SessionClosed { session: SessionId, live: usize },
    /// `killer` killed `target`.
    SessionKilled { target: SessionId, killer: SessionId },
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn handler_ready(&self, config: &Config) {
        self.record(HealthEvent::HandlerReady {
            accepted_user: config.accepted_user().to_owned(),
        });
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn session_opened(&self, session: SessionId, live: usize) {
        self.record(HealthEvent::SessionOpened { session, live });
    }

    fn session_closed(&self, session: SessionId, live: usize) {
        self.record(HealthEvent::SessionClosed { session, live });
    }

    fn session_killed(&self, target: SessionId, killer: SessionId) {
        self.record(HealthEvent::SessionKilled { target, killer });
    }
}
