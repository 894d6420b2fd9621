//! Doubles shared by the behaviour suites.

mod config_loader;
mod reporter;

pub use config_loader::FailingConfigLoader;
pub use reporter::{HealthEvent, RecordingHealthReporter};

use mocksql_types::{ColumnType, Field, QueryResult, Value};
use rstest::fixture;

use mocksql_config::Config;

use crate::ScriptedHandler;

/// Configuration that keeps the global subscriber silent when a suite
/// bootstraps.
pub fn quiet_config() -> Config {
    Config {
        log_filter: "off".to_owned(),
        ..Config::default()
    }
}

/// Handler with the default configuration.
#[fixture]
pub fn handler() -> ScriptedHandler {
    ScriptedHandler::default()
}

/// One-column, one-row result carrying `label`.
pub fn labelled(label: &str) -> QueryResult {
    QueryResult::new()
        .with_fields(vec![Field::new("label", ColumnType::VarChar)])
        .with_row(vec![Value::from(label)])
}
