//! Lifecycle events of the simulator: bootstrap outcome and the rise and
//! fall of client sessions.

use std::sync::Arc;

use mocksql_config::Config;

use crate::bootstrap::BootstrapError;
use crate::session::SessionId;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer of simulator lifecycle events.
///
/// Session hooks receive the number of live sessions after the change, so
/// a reporter can track leaks without querying the handler.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked once a handler has been built from `config`.
    fn handler_ready(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked after a session is registered.
    fn session_opened(&self, session: SessionId, live: usize);

    /// Invoked after a session is unregistered by the server.
    fn session_closed(&self, session: SessionId, live: usize);

    /// Invoked after `killer` removed `target` with a `kill` command.
    fn session_killed(&self, target: SessionId, killer: SessionId);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn handler_ready(&self, config: &Config) {
        (**self).handler_ready(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn session_opened(&self, session: SessionId, live: usize) {
        (**self).session_opened(session, live);
    }

    fn session_closed(&self, session: SessionId, live: usize) {
        (**self).session_closed(session, live);
    }

    fn session_killed(&self, target: SessionId, killer: SessionId) {
        (**self).session_killed(target, killer);
    }
}

/// Reporter that emits each event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "loading configuration"
        );
    }

    fn handler_ready(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "handler_ready",
            accepted_user = %config.accepted_user(),
            reserved_schema_prefix = %config.reserved_schema_prefix(),
            log_format = %config.log_format(),
            "scripted handler ready"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "simulator bootstrap failed"
        );
    }

    fn session_opened(&self, session: SessionId, live: usize) {
        tracing::debug!(target: HEALTH_TARGET, event = "session_opened", session, live);
    }

    fn session_closed(&self, session: SessionId, live: usize) {
        tracing::debug!(target: HEALTH_TARGET, event = "session_closed", session, live);
    }

    fn session_killed(&self, target: SessionId, killer: SessionId) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "session_killed",
            session = target,
            killer,
            "session killed"
        );
    }
}
