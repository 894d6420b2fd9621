//! Many sessions dispatching against one handler at once.

use std::sync::{Arc, Barrier};
use std::thread;

use mocksql_types::QueryResult;
use rstest::rstest;

use crate::testing::{RecordingSession, ResponseLog};
use crate::{QueryHandler, ScriptedHandler, SessionId};

use super::support::{handler, labelled};

const SESSION_IDS: [SessionId; 8] = [0, 1, 2, 3, 4, 5, 6, 7];
const CALLS_PER_SESSION: usize = 300;
const TOTAL_CALLS: usize = SESSION_IDS.len() * CALLS_PER_SESSION;

/// Issues `query` from every session concurrently and gathers what each
/// callback received.
fn dispatch_from_every_session(handler: &ScriptedHandler, query: &'static str) -> Vec<QueryResult> {
    let barrier = Arc::new(Barrier::new(SESSION_IDS.len()));
    let workers: Vec<_> = SESSION_IDS
        .into_iter()
        .map(|id| {
            let server = handler.clone();
            let start = Arc::clone(&barrier);
            thread::spawn(move || {
                let session = RecordingSession::new(id);
                server.new_session(session.clone());
                let mut log = ResponseLog::new();
                start.wait();
                for _ in 0..CALLS_PER_SESSION {
                    server
                        .com_query(session.as_ref(), query, &mut log.sink())
                        .expect("query succeeds");
                }
                log.responses().to_vec()
            })
        })
        .collect();

    workers
        .into_iter()
        .flat_map(|worker| worker.join().expect("worker thread"))
        .collect()
}

fn expected_count() -> u64 {
    u64::try_from(TOTAL_CALLS).expect("call total fits in u64")
}

#[rstest]
fn round_robin_is_shared_fairly_across_sessions(handler: ScriptedHandler) {
    let results = vec![labelled("a"), labelled("b"), labelled("c")];
    handler
        .add_queries("q", results.clone())
        .expect("non-empty sequence");

    let served = dispatch_from_every_session(&handler, "Q");

    assert_eq!(served.len(), TOTAL_CALLS);
    assert_eq!(handler.query_called("q"), expected_count());
    for result in &results {
        let share = served.iter().filter(|candidate| *candidate == result).count();
        assert_eq!(share * results.len(), TOTAL_CALLS, "uneven share for {result:?}");
    }
    assert_eq!(handler.session_count(), SESSION_IDS.len());
}

#[rstest]
fn exact_counts_survive_contention(handler: ScriptedHandler) {
    handler.add_query("select 1", QueryResult::new().with_rows_affected(1));

    let served = dispatch_from_every_session(&handler, "SELECT 1");

    assert_eq!(served.len(), TOTAL_CALLS);
    assert_eq!(handler.query_called("select 1"), expected_count());
}
