//! Racing a configured delay against a kill.

use std::thread;
use std::time::Duration;

use crossbeam_channel::{after, select};

use crate::registry::SessionEntry;

/// How a delayed query finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum DelayOutcome {
    /// The full delay elapsed.
    Elapsed,
    /// A kill arrived first.
    Cancelled,
}

/// Blocks for `delay` unless the session's cancellation channel fires first.
///
/// Exactly one outcome is produced per call. A cancelled session is marked
/// closed before returning. Sessions without a registry entry cannot be
/// killed and simply wait out the delay.
pub(super) fn wait(entry: Option<&SessionEntry>, delay: Duration) -> DelayOutcome {
    let Some(entry) = entry else {
        thread::sleep(delay);
        return DelayOutcome::Elapsed;
    };

    let outcome = select! {
        recv(entry.cancellation()) -> _ => DelayOutcome::Cancelled,
        recv(after(delay)) -> _ => DelayOutcome::Elapsed,
    };
    if outcome == DelayOutcome::Cancelled {
        entry.mark_closed();
    }
    outcome
}
