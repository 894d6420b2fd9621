//! Shared handler state behind a single lock.
//!
//! Condition tables, patterns, sessions and call counts are all mutated
//! under one `Mutex`. The lock is held only for bookkeeping; delay waits and
//! response callbacks always run after it is released.

use std::sync::{Arc, Mutex};

use crate::conditions::ConditionStore;
use crate::counter::CallCounter;
use crate::patterns::PatternStore;
use crate::registry::SessionRegistry;

/// Every table the dispatcher consults.
#[derive(Debug, Default)]
pub(crate) struct HandlerState {
    pub(crate) conditions: ConditionStore,
    pub(crate) patterns: PatternStore,
    pub(crate) sessions: SessionRegistry,
    pub(crate) calls: CallCounter,
}

/// Cloneable handle to the shared [`HandlerState`].
#[derive(Clone, Debug, Default)]
pub(crate) struct SharedState {
    inner: Arc<Mutex<HandlerState>>,
}

impl SharedState {
    /// Executes a closure with exclusive access to the state.
    ///
    /// No user code runs under the lock and every critical section leaves
    /// the tables consistent, so a poisoned guard is recovered rather than
    /// reported.
    pub(crate) fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut HandlerState) -> R,
    {
        let mut guard = self
            .inner
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        f(&mut guard)
    }
}
