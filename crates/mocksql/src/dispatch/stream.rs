//! Streaming a stored result as fields, rows and a terminal marker.

use mocksql_types::QueryResult;

use crate::errors::DispatchError;

use super::ResponseCallback;

/// Emits the fields-only piece, one piece per row, then the finished
/// marker. The first callback failure stops emission.
pub(super) fn emit(
    query: &str,
    result: &QueryResult,
    callback: &mut ResponseCallback<'_>,
) -> Result<(), DispatchError> {
    send(query, &result.fields_piece(), callback)?;
    for row in &result.rows {
        send(query, &result.row_piece(row), callback)?;
    }
    send(query, &result.finished_piece(), callback)
}

fn send(
    query: &str,
    piece: &QueryResult,
    callback: &mut ResponseCallback<'_>,
) -> Result<(), DispatchError> {
    callback(piece).map_err(|source| DispatchError::stream_emission(query, piece.state, source))
}
