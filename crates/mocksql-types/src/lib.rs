//! Result and error payloads shared by the mocksql handler and its callers.
//!
//! A scripted handler replays canned [`QueryResult`] values and
//! [`SqlError`] packets instead of executing statements. Both types are
//! plain data: they carry no behaviour beyond construction helpers and the
//! small amount of shape validation the handler needs when patterns are
//! registered.
//!
//! Streamed responses reuse [`QueryResult`] for every piece of the stream.
//! The [`ResultState`] marker tells the consumer whether a piece holds only
//! the field metadata, a single row, or the terminal marker.

mod error;
mod result;
mod value;

pub use self::error::SqlError;
pub use self::result::{ColumnType, Field, QueryResult, ResultState, Row};
pub use self::value::Value;
