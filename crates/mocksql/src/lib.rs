//! Scripted query handler for exercising MySQL clients.
//!
//! A test registers outcomes for the queries it expects, then lets a
//! protocol server drive a [`ScriptedHandler`] through the [`QueryHandler`]
//! hooks. Each incoming query is normalized to lower case and resolved in a
//! fixed order:
//!
//! 1. an exact condition installed with one of the `add_query*` methods,
//! 2. a `kill <id>` command, which closes the target session and cancels
//!    any delayed query it is waiting on,
//! 3. error patterns, then result patterns, in registration order,
//! 4. a round-robin list installed with [`ScriptedHandler::add_queries`],
//! 5. otherwise [`DispatchError::ConditionNotFound`].
//!
//! Every dispatch is counted per normalized query, including failures, and
//! the count is readable through [`ScriptedHandler::query_called`].
//!
//! The handler never parses or executes SQL. It replays what was
//! registered, and nothing more.

mod bootstrap;
mod conditions;
mod counter;
mod dispatch;
mod errors;
mod handler;
mod health;
mod patterns;
mod query;
mod registry;
mod session;
mod state;
pub mod telemetry;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use bootstrap::{
    ArgsConfigLoader, BootstrapError, ConfigLoader, Simulator, StaticConfigLoader,
    SystemConfigLoader, bootstrap_with,
};
pub use dispatch::ResponseCallback;
pub use errors::{DeliveryError, DispatchError, SetupError};
pub use handler::{QueryHandler, ScriptedHandler};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use query::normalize;
pub use session::{Session, SessionId};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
