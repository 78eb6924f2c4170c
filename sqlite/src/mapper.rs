//! Row-to-record population.
//!
//! [`fill`] re-queries the live column list on every call — the inspector
//! is the authority, never the record type — and refuses to populate at
//! all when any field lacks a live column. Per-field decode failures are
//! not fatal: the field falls back to its declared default, or stays
//! unset.
//!
//! [`fill_all`] builds a fresh instance per row through an explicit
//! factory closure and silently skips rows whose fill fails, so one bad
//! row never aborts a bulk load.

use rowmap_core::{decode, Record, SqlValue};
use rusqlite::Connection;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::inspect::{self, validate_identifier};

/// Converts a driver-level column value to the codec's storable form.
///
/// NULL and blobs (which the engine never writes) carry no value.
fn to_sql_value(raw: rusqlite::types::Value) -> Option<SqlValue> {
    match raw {
        rusqlite::types::Value::Null => None,
        rusqlite::types::Value::Integer(i) => Some(SqlValue::Integer(i)),
        rusqlite::types::Value::Real(r) => Some(SqlValue::Real(r)),
        rusqlite::types::Value::Text(s) => Some(SqlValue::Text(s)),
        rusqlite::types::Value::Blob(_) => None,
    }
}

/// Populates a record from the cursor's current row.
///
/// The live column list for `table` is re-queried first; a field whose
/// resolved column is absent fails the whole fill before anything is
/// assigned. For each present field the stored value is decoded to the
/// declared type: success assigns, failure falls back to the declared
/// default if any, otherwise the field is left unset.
///
/// # Errors
///
/// - [`StoreError::ColumnMissing`] when a field has no live column.
/// - [`StoreError::Database`] on driver failure.
pub fn fill<R: Record>(conn: &Connection, record: &mut R, row: &rusqlite::Row<'_>) -> Result<()> {
    let table = R::table_name();
    let live = inspect::columns(conn, table)?;

    let fields: Vec<_> = R::fields().into_iter().filter(|f| !f.ignored).collect();

    // Validate the full field set before assigning anything.
    for field in &fields {
        let column = field.column_name();
        if !live.iter().any(|c| c.name == column) {
            return Err(StoreError::ColumnMissing {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
    }

    for field in &fields {
        let column = field.column_name();
        let raw: rusqlite::types::Value = row.get(column)?;
        let decoded = to_sql_value(raw).and_then(|sql| decode(&sql, &field.semantic));
        let value = match decoded {
            Some(value) => value,
            None => match &field.default {
                Some(default) => default.clone(),
                None => continue,
            },
        };
        if !record.set(field.name, value) {
            debug!(table, field = field.name, "record refused assignment");
        }
    }
    Ok(())
}

/// Loads every row of a table, constructing one record per row.
///
/// Each instance comes from the explicit `factory` closure. Rows whose
/// fill fails are skipped, not reported — a resilience choice so partial
/// or foreign data never aborts a bulk load.
///
/// # Errors
///
/// Returns [`StoreError::Database`] when the table cannot be queried at
/// all; per-row failures are absorbed.
pub fn fill_all<R, F>(conn: &Connection, mut factory: F) -> Result<Vec<R>>
where
    R: Record,
    F: FnMut() -> R,
{
    let table = R::table_name();
    validate_identifier(table)?;

    let mut stmt = conn.prepare(&format!("SELECT * FROM {table}"))?;
    let mut rows = stmt.query([])?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = factory();
        match fill(conn, &mut record, row) {
            Ok(()) => records.push(record),
            Err(err) => debug!(table, error = %err, "skipping row"),
        }
    }
    Ok(records)
}
