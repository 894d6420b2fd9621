//! Regular-expression patterns answering queries without an exact match.
//!
//! Every pattern is wrapped as `^(?:pattern)$` and compiled with
//! case-insensitive and dot-matches-newline flags when it is registered, so
//! a pattern always has to match the whole query. Error patterns and result
//! patterns live in separate lists. Within a list the first registered
//! match wins.

use mocksql_types::{QueryResult, SqlError};
use regex::{Regex, RegexBuilder};

use crate::errors::SetupError;

/// Compiles `pattern` with full anchoring and case-insensitive matching.
///
/// # Errors
///
/// Returns [`SetupError::InvalidPattern`] if the pattern does not compile.
fn compile_anchored(pattern: &str) -> Result<Regex, SetupError> {
    RegexBuilder::new(&format!("^(?:{pattern})$"))
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .map_err(|source| SetupError::invalid_pattern(pattern, source))
}

/// A compiled pattern paired with the outcome it produces.
#[derive(Debug, Clone)]
pub(crate) struct PatternEntry<T> {
    source: String,
    expr: Regex,
    outcome: T,
}

impl<T> PatternEntry<T> {
    /// Pattern text as registered, before anchoring.
    #[must_use]
    pub(crate) fn source(&self) -> &str {
        &self.source
    }

    /// Returns true when the pattern matches the whole query.
    #[must_use]
    pub(crate) fn matches(&self, query: &str) -> bool {
        self.expr.is_match(query)
    }

    /// Outcome produced on a match.
    #[must_use]
    pub(crate) const fn outcome(&self) -> &T {
        &self.outcome
    }
}

impl PatternEntry<QueryResult> {
    /// Builds a result pattern.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::MissingFields`] if `result` has rows but no
    /// fields, or [`SetupError::InvalidPattern`] if the pattern does not
    /// compile.
    pub(crate) fn result(pattern: &str, result: QueryResult) -> Result<Self, SetupError> {
        if !result.has_schema_for_rows() {
            return Err(SetupError::missing_fields(pattern));
        }
        Ok(Self {
            source: pattern.to_owned(),
            expr: compile_anchored(pattern)?,
            outcome: result,
        })
    }
}

impl PatternEntry<SqlError> {
    /// Builds an error pattern.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::InvalidPattern`] if the pattern does not
    /// compile.
    pub(crate) fn error(pattern: &str, error: SqlError) -> Result<Self, SetupError> {
        Ok(Self {
            source: pattern.to_owned(),
            expr: compile_anchored(pattern)?,
            outcome: error,
        })
    }
}

/// Ordered error and result patterns.
#[derive(Debug, Default)]
pub(crate) struct PatternStore {
    errors: Vec<PatternEntry<SqlError>>,
    results: Vec<PatternEntry<QueryResult>>,
}

impl PatternStore {
    /// Appends an error pattern.
    pub(crate) fn push_error(&mut self, entry: PatternEntry<SqlError>) {
        self.errors.push(entry);
    }

    /// Appends a result pattern.
    pub(crate) fn push_result(&mut self, entry: PatternEntry<QueryResult>) {
        self.results.push(entry);
    }

    /// First error pattern matching `query`, in registration order.
    #[must_use]
    pub(crate) fn first_error(&self, query: &str) -> Option<&PatternEntry<SqlError>> {
        self.errors.iter().find(|entry| entry.matches(query))
    }

    /// First result pattern matching `query`, in registration order.
    #[must_use]
    pub(crate) fn first_result(&self, query: &str) -> Option<&PatternEntry<QueryResult>> {
        self.results.iter().find(|entry| entry.matches(query))
    }

    /// Removes every pattern.
    pub(crate) fn clear(&mut self) {
        self.errors.clear();
        self.results.clear();
    }

    /// Removes only the error patterns.
    pub(crate) fn clear_errors(&mut self) {
        self.errors.clear();
    }
}

#[cfg(test)]
mod tests;
