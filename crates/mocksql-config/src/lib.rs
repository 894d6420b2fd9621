//! Shared configuration for the mocksql handler.
//!
//! Values are layered by `ortho_config`: built-in defaults, then a TOML file
//! named by `--config-path` or `MOCKSQL_CONFIG_PATH`, then `MOCKSQL_*`
//! environment variables, then command-line flags. Every field has a default
//! so loading with no sources yields a usable configuration.
//!
//! ```toml
//! log_filter = "mocksql=debug"
//! log_format = "compact"
//! accepted_user = "mock"
//! ```

mod defaults;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

pub use defaults::{DEFAULT_ACCEPTED_USER, DEFAULT_LOG_FILTER, DEFAULT_RESERVED_SCHEMA_PREFIX};
pub use ortho_config::{OrthoConfig, OrthoError};

/// How log lines are rendered on stderr.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, fields flattened.
    #[default]
    Json,
    /// Single-line text for reading in a terminal or test output.
    Compact,
}

impl LogFormat {
    /// Returns true when events are emitted as machine-readable records.
    #[must_use]
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// A loaded configuration the handler cannot use.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A field held a value the handler cannot use.
    #[error("invalid configuration field '{field}': {message}")]
    Invalid {
        /// Field name.
        field: &'static str,
        /// Description of the problem.
        message: String,
    },
}

/// Resolved handler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MOCKSQL")]
pub struct Config {
    /// `tracing` filter expression.
    #[serde(default = "defaults::default_log_filter_string")]
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log lines.
    #[serde(default = "defaults::default_log_format")]
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
    /// User name accepted by the authentication check.
    #[serde(default = "defaults::default_accepted_user")]
    #[ortho_config(default = defaults::default_accepted_user())]
    pub accepted_user: String,
    /// Database names with this prefix are rejected on selection.
    #[serde(default = "defaults::default_reserved_schema_prefix")]
    #[ortho_config(default = defaults::default_reserved_schema_prefix())]
    pub reserved_schema_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: defaults::default_log_filter_string(),
            log_format: defaults::default_log_format(),
            accepted_user: defaults::default_accepted_user(),
            reserved_schema_prefix: defaults::default_reserved_schema_prefix(),
        }
    }
}

impl Config {
    /// Checks that the configuration is usable.
    ///
    /// An empty reserved prefix would reject every database name, so it is
    /// refused along with an empty user or filter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("log_filter", &self.log_filter),
            ("accepted_user", &self.accepted_user),
            ("reserved_schema_prefix", &self.reserved_schema_prefix),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    message: "must not be empty".to_owned(),
                });
            }
        }
        Ok(())
    }

    /// Returns the `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Returns the user accepted by the authentication check.
    #[must_use]
    pub fn accepted_user(&self) -> &str {
        &self.accepted_user
    }

    /// Returns the reserved database name prefix.
    #[must_use]
    pub fn reserved_schema_prefix(&self) -> &str {
        &self.reserved_schema_prefix
    }
}
