//! Default values for every [`crate::Config`] layer.

/// Default log filter expression.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// The only user name accepted by the handler's authentication check.
pub const DEFAULT_ACCEPTED_USER: &str = "mock";

/// Database names starting with this prefix are rejected on selection.
pub const DEFAULT_RESERVED_SCHEMA_PREFIX: &str = "xx";

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format.
pub const fn default_log_format() -> crate::LogFormat {
    crate::LogFormat::Json
}

/// Owned accepted user used by serde.
pub fn default_accepted_user() -> String {
    DEFAULT_ACCEPTED_USER.to_owned()
}

/// Owned reserved schema prefix used by serde.
pub fn default_reserved_schema_prefix() -> String {
    DEFAULT_RESERVED_SCHEMA_PREFIX.to_owned()
}
