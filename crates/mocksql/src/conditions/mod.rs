//! Exact-match conditions and round-robin result sequences.
//!
//! A `Condition` is the single configured outcome for one normalized
//! query. Installing a condition for a query that already has one replaces
//! it. A `ConditionList` serves a sequence of results for one query in a
//! cycle; its cursor is shared by every caller of that query, so concurrent
//! callers observe interleaved positions rather than private sequences.

use std::collections::HashMap;
use std::time::Duration;

use mocksql_types::{QueryResult, SqlError};
use strum::Display;

/// Kind of outcome a condition produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub(crate) enum ConditionKind {
    /// Return the stored result.
    Normal,
    /// Return the stored result after a delay, unless killed.
    Delay,
    /// Return the stored error.
    Error,
    /// Abort the session deliberately.
    Panic,
    /// Stream the stored result piece by piece.
    Stream,
}

/// The payload behind each kind, so a condition cannot hold a result where
/// an error is expected.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Outcome {
    Normal(QueryResult),
    Delay(QueryResult, Duration),
    Error(SqlError),
    Panic,
    Stream(QueryResult),
}

/// One configured outcome for an exact query.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Condition {
    query: String,
    outcome: Outcome,
}

impl Condition {
    fn new(query: &str, outcome: Outcome) -> Self {
        Self {
            query: crate::query::normalize(query),
            outcome,
        }
    }

    /// Condition returning `result` immediately.
    #[must_use]
    pub(crate) fn normal(query: &str, result: QueryResult) -> Self {
        Self::new(query, Outcome::Normal(result))
    }

    /// Condition returning `result` after `delay`.
    #[must_use]
    pub(crate) fn delayed(query: &str, result: QueryResult, delay: Duration) -> Self {
        Self::new(query, Outcome::Delay(result, delay))
    }

    /// Condition failing with `error`.
    #[must_use]
    pub(crate) fn error(query: &str, error: SqlError) -> Self {
        Self::new(query, Outcome::Error(error))
    }

    /// Condition that aborts the session.
    #[must_use]
    pub(crate) fn panic(query: &str) -> Self {
        Self::new(query, Outcome::Panic)
    }

    /// Condition streaming `result` as fields, rows and a terminal marker.
    #[must_use]
    pub(crate) fn stream(query: &str, result: QueryResult) -> Self {
        Self::new(query, Outcome::Stream(result))
    }

    /// Normalized query this condition answers.
    #[must_use]
    pub(crate) fn query(&self) -> &str {
        &self.query
    }

    /// Kind of outcome.
    #[must_use]
    pub(crate) const fn kind(&self) -> ConditionKind {
        match self.outcome {
            Outcome::Normal(_) => ConditionKind::Normal,
            Outcome::Delay(..) => ConditionKind::Delay,
            Outcome::Error(_) => ConditionKind::Error,
            Outcome::Panic => ConditionKind::Panic,
            Outcome::Stream(_) => ConditionKind::Stream,
        }
    }

    pub(crate) const fn outcome(&self) -> &Outcome {
        &self.outcome
    }
}

/// Results served in order for one query, wrapping after the last.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ConditionList {
    results: Vec<QueryResult>,
    cursor: usize,
}

impl ConditionList {
    /// Creates a list positioned at its first result. Returns `None` for an
    /// empty sequence.
    #[must_use]
    pub(crate) fn new(results: Vec<QueryResult>) -> Option<Self> {
        if results.is_empty() {
            return None;
        }
        Some(Self { results, cursor: 0 })
    }

    /// Returns the result at the cursor and advances it.
    pub(crate) fn serve(&mut self) -> Option<QueryResult> {
        let current = self.results.get(self.cursor).cloned();
        let next = self.cursor.saturating_add(1);
        self.cursor = if next >= self.results.len() { 0 } else { next };
        current
    }
}

/// Exact conditions and round-robin lists keyed by normalized query.
#[derive(Debug, Default)]
pub(crate) struct ConditionStore {
    conditions: HashMap<String, Condition>,
    lists: HashMap<String, ConditionList>,
}

impl ConditionStore {
    /// Installs `condition`, returning the one it replaced.
    pub(crate) fn install(&mut self, condition: Condition) -> Option<Condition> {
        self.conditions
            .insert(condition.query().to_owned(), condition)
    }

    /// Installs a round-robin list for an already normalized query.
    pub(crate) fn install_list(&mut self, query: String, list: ConditionList) {
        self.lists.insert(query, list);
    }

    /// Looks up the exact condition for a normalized query.
    #[must_use]
    pub(crate) fn get(&self, query: &str) -> Option<&Condition> {
        self.conditions.get(query)
    }

    /// Serves the next round-robin result for a normalized query.
    pub(crate) fn serve_list(&mut self, query: &str) -> Option<QueryResult> {
        self.lists.get_mut(query).and_then(ConditionList::serve)
    }

    /// Removes every condition and list.
    pub(crate) fn clear(&mut self) {
        self.conditions.clear();
        self.lists.clear();
    }

    /// Removes error conditions, keeping every other kind.
    pub(crate) fn clear_errors(&mut self) {
        self.conditions
            .retain(|_, condition| condition.kind() != ConditionKind::Error);
    }
}
