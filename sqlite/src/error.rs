//! Error types for the SQLite mapping engine.
//!
//! These never cross the [`RecordStore`](crate::RecordStore) boundary:
//! the facade flattens them to success flags after logging the cause.

use thiserror::Error;

/// Errors that can occur during mapping operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite driver failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A field value could not be encoded for storage.
    #[error("encoding error: {0}")]
    Codec(#[from] rowmap_core::CodecError),

    /// Table or column name contains invalid characters.
    #[error(
        "invalid identifier '{0}': must be non-empty, contain only alphanumerics \
         and underscores, and not start with a digit"
    )]
    InvalidIdentifier(String),

    /// The record type declares no storable fields.
    #[error("record type for table '{0}' declares no storable fields")]
    NoFields(String),

    /// More than one field is marked primary key.
    #[error("record type for table '{0}' declares more than one primary key")]
    DuplicatePrimaryKey(String),

    /// Two fields resolve to the same column name.
    #[error("record type for table '{table}' maps more than one field to column '{column}'")]
    DuplicateColumn {
        /// Target table.
        table: String,
        /// Column name claimed by more than one field.
        column: String,
    },

    /// A declared default's storage class disagrees with its column's.
    #[error("default value for column '{0}' does not match the column's storage class")]
    DefaultTypeMismatch(String),

    /// Update/delete require a declared primary key with a non-null value.
    #[error("no usable primary key for table '{0}'")]
    MissingPrimaryKey(String),

    /// Every SET-eligible field was null.
    #[error("no columns to update for table '{0}'")]
    EmptyUpdate(String),

    /// Every match-eligible field was null.
    #[error("no columns to match for delete from table '{0}'")]
    EmptyDelete(String),

    /// A record field has no counterpart in the live table schema.
    #[error("column '{column}' is missing from table '{table}'")]
    ColumnMissing {
        /// Live table that was inspected.
        table: String,
        /// Resolved column name with no counterpart.
        column: String,
    },

    /// A generated placeholder was not found in the prepared statement.
    #[error("parameter '{0}' is not bound in the prepared statement")]
    UnboundParameter(String),

    /// Insert refused because a row with the same key already exists.
    #[error("key value already present in '{table}.{column}'")]
    KeyAlreadyPresent {
        /// Target table.
        table: String,
        /// Primary-key column.
        column: String,
    },
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
