//! Process-wide `tracing` subscriber for the simulator.
//!
//! Only the first successful call installs a subscriber. Later calls see
//! the format that won and report that they reused it.

use std::io::{self, IsTerminal};

use mocksql_config::{Config, LogFormat};
use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

const TELEMETRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::telemetry");

static INSTALLED_FORMAT: OnceCell<LogFormat> = OnceCell::new();

/// Describes the subscriber in effect after [`initialise`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
    installed: bool,
}

impl TelemetryHandle {
    /// Format of the subscriber that is actually installed.
    #[must_use]
    pub const fn format(self) -> LogFormat {
        self.format
    }

    /// True only for the call that installed the subscriber.
    #[must_use]
    pub const fn installed(self) -> bool {
        self.installed
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// Rejected filter expression.
        filter: String,
        /// Parser message.
        message: String,
    },
    /// Another subscriber was already installed outside this module.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Installs the global subscriber described by `config` on first use.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an unparsable filter and
/// [`TelemetryError::Subscriber`] when a subscriber was set elsewhere.
///
/// # Examples
///
/// ```rust
/// use mocksql::telemetry;
/// use mocksql_config::Config;
///
/// # fn main() -> Result<(), mocksql::TelemetryError> {
/// let config = Config {
///     log_filter: "off".to_owned(),
///     ..Config::default()
/// };
/// let first = telemetry::initialise(&config)?;
/// let again = telemetry::initialise(&config)?;
/// assert!(!again.installed());
/// assert_eq!(first.format(), again.format());
/// # Ok(())
/// # }
/// ```
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let mut installed = false;
    let format = INSTALLED_FORMAT.get_or_try_init(|| {
        let subscriber = build_subscriber(config)?;
        tracing::subscriber::set_global_default(subscriber)?;
        installed = true;
        Ok::<_, TelemetryError>(config.log_format())
    })?;
    if installed {
        tracing::debug!(
            target: TELEMETRY_TARGET,
            format = %format,
            filter = config.log_filter(),
            "telemetry installed"
        );
    }
    Ok(TelemetryHandle {
        format: *format,
        installed,
    })
}

fn build_subscriber(config: &Config) -> Result<Box<dyn Subscriber + Send + Sync>, TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter()).map_err(|error| TelemetryError::Filter {
        filter: config.log_filter().to_owned(),
        message: error.to_string(),
    })?;
    let structured = config.log_format().is_structured();
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .with_ansi(!structured && io::stderr().is_terminal())
        .with_timer(fmt::time::UtcTime::rfc_3339());

    Ok(if structured {
        Box::new(builder.json().flatten_event(true).finish())
    } else {
        Box::new(builder.compact().finish())
    })
}
