//! Global subscriber installation, isolated in its own test binary.

use mocksql::telemetry;
use mocksql_config::{Config, LogFormat};

#[test]
fn first_call_installs_and_later_calls_reuse() {
    let unparsable = Config {
        log_filter: "mocksql=loud".to_owned(),
        ..Config::default()
    };
    let error = telemetry::initialise(&unparsable).expect_err("level name is unknown");
    assert!(error.to_string().contains("mocksql=loud"));

    let compact = Config {
        log_format: LogFormat::Compact,
        log_filter: "warn".to_owned(),
        ..Config::default()
    };
    let first = telemetry::initialise(&compact).expect("install subscriber");
    assert!(first.installed());
    assert_eq!(first.format(), LogFormat::Compact);

    let json = Config::default();
    let second = telemetry::initialise(&json).expect("reuse subscriber");
    assert!(!second.installed());
    assert_eq!(second.format(), LogFormat::Compact);
}
