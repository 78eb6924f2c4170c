//! Live schema introspection.
//!
//! The inspector is the single source of truth for "does this record type
//! fit this table": column lists are always re-queried from
//! `pragma_table_info`, never derived from the record type. Identifier
//! validation guards every table or column name that gets interpolated
//! into SQL text.

use rusqlite::{params, Connection};

use crate::error::{Result, StoreError};

/// One column of a live table, as reported by `pragma_table_info`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    /// Zero-based position in the table definition.
    pub ordinal: i64,
    /// Column name.
    pub name: String,
    /// Declared type text (e.g. `INTEGER`, `TEXT`).
    pub sql_type: String,
    /// Default literal as stored in the schema, if any.
    pub default_literal: Option<String>,
    /// Whether the column is declared NOT NULL.
    pub not_null: bool,
    /// Whether the column is part of the primary key.
    pub primary_key: bool,
}

/// Validates a table or column identifier before SQL interpolation.
///
/// Accepts non-empty strings of alphanumerics and underscores that do not
/// start with a digit.
pub(crate) fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

/// Lists all table names in the store, ordered by name.
///
/// # Errors
///
/// Returns [`StoreError::Database`] on driver failure.
pub fn tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Whether a table with the given name exists.
///
/// # Errors
///
/// Returns [`StoreError::InvalidIdentifier`] for a malformed name and
/// [`StoreError::Database`] on driver failure.
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    validate_identifier(table)?;
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Queries the live column list of a table, ordered by ordinal.
///
/// Returns an empty list for a table that does not exist, matching the
/// pragma's own behavior.
///
/// # Errors
///
/// Returns [`StoreError::InvalidIdentifier`] for a malformed name and
/// [`StoreError::Database`] on driver failure.
pub fn columns(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>> {
    validate_identifier(table)?;
    let mut stmt = conn.prepare(
        "SELECT cid, name, type, dflt_value, \"notnull\", pk \
         FROM pragma_table_info(?1) ORDER BY cid",
    )?;
    let rows = stmt.query_map(params![table], |row| {
        Ok(ColumnInfo {
            ordinal: row.get(0)?,
            name: row.get(1)?,
            sql_type: row.get(2)?,
            default_literal: row.get(3)?,
            not_null: row.get::<_, i64>(4)? != 0,
            primary_key: row.get::<_, i64>(5)? != 0,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
