//! Canned result sets and the stream-state marker.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::value::Value;

/// One row of cells, ordered to match the result's fields.
pub type Row = Vec<Value>;

/// Column type advertised in field metadata.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ColumnType {
    /// Signed 64-bit integer.
    Int64,
    /// Unsigned 64-bit integer.
    Uint64,
    /// Variable-length character data.
    #[default]
    VarChar,
    /// Binary large object.
    Blob,
    /// Column that only ever holds `NULL`.
    Null,
}

/// Field (column) metadata describing one column of a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Column name as reported to the client.
    pub name: String,
    /// Column type.
    #[serde(default)]
    pub column_type: ColumnType,
}

impl Field {
    /// Creates field metadata for a named column.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// Marks which part of a response a [`QueryResult`] carries.
///
/// Whole results use [`ResultState::Complete`]. Streamed results are split
/// into one `Fields` piece, one `Rows` piece per row and a final `Finished`
/// piece.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResultState {
    /// The result is delivered in one piece.
    #[default]
    Complete,
    /// Only the field metadata of a stream.
    Fields,
    /// One row of a stream.
    Rows,
    /// Terminal marker of a stream.
    Finished,
}

/// A canned query result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column metadata.
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Row data, each row ordered like `fields`.
    #[serde(default)]
    pub rows: Vec<Row>,
    /// Rows affected by a DML statement.
    #[serde(default)]
    pub rows_affected: u64,
    /// Last insert id reported by a DML statement.
    #[serde(default)]
    pub insert_id: u64,
    /// Number of warnings reported with the result.
    #[serde(default)]
    pub warnings: u16,
    /// Which part of a response this value carries.
    #[serde(default)]
    pub state: ResultState,
}

impl QueryResult {
    /// Creates an empty result, the acknowledgment for statements without
    /// output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the field metadata.
    #[must_use]
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    /// Appends one row.
    #[must_use]
    pub fn with_row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    /// Replaces all rows.
    #[must_use]
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    /// Sets the affected-row count.
    #[must_use]
    pub const fn with_rows_affected(mut self, rows_affected: u64) -> Self {
        self.rows_affected = rows_affected;
        self
    }

    /// Sets the last insert id.
    #[must_use]
    pub const fn with_insert_id(mut self, insert_id: u64) -> Self {
        self.insert_id = insert_id;
        self
    }

    /// Returns true when the result carries no fields and no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.rows.is_empty()
    }

    /// Returns true unless the result has rows but no field metadata.
    ///
    /// Rows without fields cannot be encoded as a result set, so such a
    /// value is rejected wherever it would be streamed later.
    #[must_use]
    pub fn has_schema_for_rows(&self) -> bool {
        self.rows.is_empty() || !self.fields.is_empty()
    }

    /// Builds the fields-only piece of a stream.
    #[must_use]
    pub fn fields_piece(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            state: ResultState::Fields,
            ..Self::default()
        }
    }

    /// Builds the piece of a stream that carries `row`.
    #[must_use]
    pub fn row_piece(&self, row: &Row) -> Self {
        Self {
            fields: self.fields.clone(),
            rows: vec![row.clone()],
            state: ResultState::Rows,
            ..Self::default()
        }
    }

    /// Builds the terminal piece of a stream.
    #[must_use]
    pub fn finished_piece(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            state: ResultState::Finished,
            ..Self::default()
        }
    }
}
