//! Live sessions and the cancellation channels behind `kill <id>`.
//!
//! Each registered session owns a bounded cancellation channel. A kill
//! issued from another session sends on that channel without blocking and
//! removes the entry; a delayed query running on the target session races
//! the channel against its timer.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::session::{Session, SessionId};

/// Capacity of each cancellation channel. Two pending signals never block
/// the sender even if the target never drains them.
pub(crate) const CANCEL_CAPACITY: usize = 2;

/// Registry record for one live session.
pub(crate) struct SessionEntry {
    session: Arc<dyn Session>,
    closed: AtomicBool,
    cancel_tx: Sender<()>,
    cancel_rx: Receiver<()>,
}

impl SessionEntry {
    fn new(session: Arc<dyn Session>) -> Self {
        let (cancel_tx, cancel_rx) = bounded(CANCEL_CAPACITY);
        Self {
            session,
            closed: AtomicBool::new(false),
            cancel_tx,
            cancel_rx,
        }
    }

    /// Session this entry tracks.
    #[must_use]
    pub(crate) fn session(&self) -> &Arc<dyn Session> {
        &self.session
    }

    /// Returns true once a kill has interrupted this session.
    #[must_use]
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Marks the session closed.
    pub(crate) fn mark_closed(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Receiver that yields once per cancellation request.
    #[must_use]
    pub(crate) const fn cancellation(&self) -> &Receiver<()> {
        &self.cancel_rx
    }

    /// Sends a cancellation request without blocking. Returns false when
    /// the channel is already full.
    pub(crate) fn signal_cancel(&self) -> bool {
        match self.cancel_tx.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) | Err(TrySendError::Disconnected(())) => false,
        }
    }
}

impl fmt::Debug for SessionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionEntry")
            .field("id", &self.session.id())
            .field("closed", &self.is_closed())
            .field("pending_cancels", &self.cancel_rx.len())
            .finish_non_exhaustive()
    }
}

/// Live sessions keyed by id.
#[derive(Debug, Default)]
pub(crate) struct SessionRegistry {
    entries: HashMap<SessionId, Arc<SessionEntry>>,
}

impl SessionRegistry {
    /// Registers `session` with a fresh cancellation channel, replacing any
    /// entry with the same id.
    pub(crate) fn register(&mut self, session: Arc<dyn Session>) -> Arc<SessionEntry> {
        let id = session.id();
        let entry = Arc::new(SessionEntry::new(session));
        self.entries.insert(id, Arc::clone(&entry));
        entry
    }

    /// Removes the entry for `id`.
    pub(crate) fn unregister(&mut self, id: SessionId) -> Option<Arc<SessionEntry>> {
        self.entries.remove(&id)
    }

    /// Returns the entry for `id`.
    #[must_use]
    pub(crate) fn get(&self, id: SessionId) -> Option<Arc<SessionEntry>> {
        self.entries.get(&id).cloned()
    }

    /// Runs the kill protocol against `id`.
    ///
    /// Unknown sessions yield `None`. Otherwise the entry is removed, its
    /// cancellation channel signalled, and its session returned so the
    /// caller can close it once the registry lock is released.
    ///
    /// An entry is only ever marked closed after a kill has removed it, so
    /// every entry still in the map is live and a repeated kill of the same
    /// id finds nothing.
    pub(crate) fn kill(&mut self, id: SessionId) -> Option<Arc<dyn Session>> {
        let entry = self.entries.remove(&id)?;
        entry.signal_cancel();
        Some(Arc::clone(entry.session()))
    }

    /// Returns true when `id` is registered.
    #[must_use]
    pub(crate) fn contains(&self, id: SessionId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of live sessions.
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
