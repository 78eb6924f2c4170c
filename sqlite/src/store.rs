//! The externally visible store facade.
//!
//! [`RecordStore`] sequences the engine per write operation: ensure the
//! table exists, validate that the record's field set fits the live
//! schema, generate the statement, execute it. Any validation failure
//! short-circuits without touching the store.
//!
//! Errors never cross this boundary. Mutations return `true` on success
//! and `false` on any failure — schema mismatch, encoding failure, or
//! driver error all present the same way, with the cause emitted through
//! `tracing` first. Reads return values-or-empty.

use std::path::PathBuf;

use rowmap_core::{encode, primary_key_field, Record};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::command::{self, DeleteScope, Statement};
use crate::error::{Result, StoreError};
use crate::inspect;
use crate::mapper;

/// Tunable store behavior.
///
/// The only knob today is the DELETE row-matching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreOptions {
    /// Row-matching strategy for deletes.
    pub delete_scope: DeleteScope,
}

/// Maps record types to tables of a single SQLite database.
///
/// Holds one logical connection, opened lazily on the first operation and
/// reused afterwards; a store that has not been used yet has done no I/O.
///
/// # Examples
///
/// ```no_run
/// use rowmap_sqlite::RecordStore;
/// # use rowmap_core::{FieldSpec, Record, SemanticType, Value};
/// # #[derive(Default)]
/// # struct Widget;
/// # impl Record for Widget {
/// #     fn table_name() -> &'static str { "widgets" }
/// #     fn fields() -> Vec<FieldSpec> {
/// #         vec![FieldSpec::new("id", SemanticType::Text).primary_key()]
/// #     }
/// #     fn get(&self, _: &str) -> Option<Value> { None }
/// #     fn set(&mut self, _: &str, _: Value) -> bool { false }
/// # }
///
/// let mut store = RecordStore::open("widgets.db");
/// let widget = Widget::default();
/// if !store.add(&widget) {
///     eprintln!("insert refused");
/// }
/// let all: Vec<Widget> = store.load_all();
/// println!("{} widgets", all.len());
/// ```
pub struct RecordStore {
    /// `None` selects an in-memory database.
    path: Option<PathBuf>,
    conn: Option<Connection>,
    options: StoreOptions,
}

impl RecordStore {
    /// Creates a store backed by the database file at `path`.
    ///
    /// No I/O happens until the first operation.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            conn: None,
            options: StoreOptions::default(),
        }
    }

    /// Creates a store backed by an in-memory database.
    ///
    /// The data lives as long as the store; dropping it discards
    /// everything.
    pub fn open_in_memory() -> Self {
        Self {
            path: None,
            conn: None,
            options: StoreOptions::default(),
        }
    }

    /// Replaces the store's options.
    #[must_use]
    pub fn with_options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// The lazily opened connection, reopened if currently absent.
    fn conn(&mut self) -> Result<&Connection> {
        let conn = match self.conn.take() {
            Some(conn) => conn,
            None => match &self.path {
                Some(path) => Connection::open(path)?,
                None => Connection::open_in_memory()?,
            },
        };
        Ok(self.conn.insert(conn))
    }

    /// Direct access to the underlying connection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] when the connection cannot be
    /// opened.
    pub fn connection(&mut self) -> Result<&Connection> {
        self.conn()
    }

    /// Creates the table for a record type if it does not already exist.
    ///
    /// Safe to call repeatedly: an existing table is left untouched, so
    /// columns are never duplicated. Returns `false` when the record type
    /// itself is invalid (zero fields, duplicate key, default-type
    /// disagreement) or on driver failure.
    pub fn ensure_table<R: Record>(&mut self) -> bool {
        match self.try_ensure_table::<R>() {
            Ok(()) => true,
            Err(err) => {
                warn!(table = R::table_name(), error = %err, "ensure table failed");
                false
            }
        }
    }

    /// Inserts a record as a new row.
    ///
    /// Refuses when the field set does not fit the live table, when the
    /// primary key's value is already present, or when any field fails
    /// encoding. Returns `true` only when exactly the new row was
    /// written.
    pub fn add<R: Record>(&mut self, record: &R) -> bool {
        match self.try_add(record) {
            Ok(affected) => affected > 0,
            Err(err) => {
                warn!(table = R::table_name(), error = %err, "add failed");
                false
            }
        }
    }

    /// Updates the row matching the record's primary key.
    ///
    /// Returns `true` when at least one row was affected; a key that
    /// matches nothing and a driver failure both present as `false`.
    pub fn update<R: Record>(&mut self, record: &R) -> bool {
        match self.try_update(record) {
            Ok(affected) => affected > 0,
            Err(err) => {
                warn!(table = R::table_name(), error = %err, "update failed");
                false
            }
        }
    }

    /// Deletes the row matching the record.
    ///
    /// The matching strategy comes from [`StoreOptions::delete_scope`]:
    /// full-row-state equality by default, primary-key-only when
    /// narrowed. Returns `true` when at least one row was removed.
    pub fn delete<R: Record>(&mut self, record: &R) -> bool {
        match self.try_delete(record) {
            Ok(affected) => affected > 0,
            Err(err) => {
                warn!(table = R::table_name(), error = %err, "delete failed");
                false
            }
        }
    }

    /// Loads every row of the record type's table.
    ///
    /// Instances come from the explicit `factory` closure; rows that fail
    /// to populate are skipped. A missing table or driver failure yields
    /// an empty list.
    pub fn fill_all<R, F>(&mut self, factory: F) -> Vec<R>
    where
        R: Record,
        F: FnMut() -> R,
    {
        match self.try_fill_all(factory) {
            Ok(records) => records,
            Err(err) => {
                warn!(table = R::table_name(), error = %err, "fill all failed");
                Vec::new()
            }
        }
    }

    /// [`fill_all`](Self::fill_all) with `R::default` as the factory.
    pub fn load_all<R: Record + Default>(&mut self) -> Vec<R> {
        self.fill_all(R::default)
    }

    /// Lists the tables currently present in the store.
    pub fn tables(&mut self) -> Vec<String> {
        let result = self.conn().and_then(inspect::tables);
        match result {
            Ok(tables) => tables,
            Err(err) => {
                warn!(error = %err, "listing tables failed");
                Vec::new()
            }
        }
    }

    fn try_ensure_table<R: Record>(&mut self) -> Result<()> {
        // Generate first so an invalid record type is rejected even when
        // the table already exists.
        let stmt = command::create_table::<R>()?;
        let conn = self.conn()?;
        if inspect::table_exists(conn, R::table_name())? {
            return Ok(());
        }
        conn.execute(&stmt.text, [])?;
        debug!(table = R::table_name(), "table created");
        Ok(())
    }

    /// Checks that every non-ignored field resolves to a live column.
    fn validate_fit<R: Record>(conn: &Connection) -> Result<()> {
        let table = R::table_name();
        let live = inspect::columns(conn, table)?;
        for field in R::fields().iter().filter(|f| !f.ignored) {
            let column = field.column_name();
            if !live.iter().any(|c| c.name == column) {
                return Err(StoreError::ColumnMissing {
                    table: table.to_string(),
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Read-then-act uniqueness check on the primary key, when the record
    /// carries one.
    fn check_key_free<R: Record>(conn: &Connection, record: &R) -> Result<()> {
        let table = R::table_name();
        let fields = R::fields();
        let Some(key) = primary_key_field(&fields) else {
            return Ok(());
        };
        let Some(value) = record.get(key.name) else {
            return Ok(());
        };
        let column = key.column_name();
        inspect::validate_identifier(column)?;
        let (_, sql) = encode(&value)?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1"),
            params![bind_value(&sql)],
            |row| row.get(0),
        )?;
        if count > 0 {
            return Err(StoreError::KeyAlreadyPresent {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
        Ok(())
    }

    fn try_add<R: Record>(&mut self, record: &R) -> Result<usize> {
        self.try_ensure_table::<R>()?;
        let conn = self.conn()?;
        Self::validate_fit::<R>(conn)?;
        Self::check_key_free(conn, record)?;
        let stmt = command::insert(record)?;
        execute_statement(conn, &stmt)
    }

    fn try_update<R: Record>(&mut self, record: &R) -> Result<usize> {
        self.try_ensure_table::<R>()?;
        let conn = self.conn()?;
        Self::validate_fit::<R>(conn)?;
        let stmt = command::update(record)?;
        execute_statement(conn, &stmt)
    }

    fn try_delete<R: Record>(&mut self, record: &R) -> Result<usize> {
        let scope = self.options.delete_scope;
        self.try_ensure_table::<R>()?;
        let conn = self.conn()?;
        Self::validate_fit::<R>(conn)?;
        let stmt = command::delete(record, scope)?;
        execute_statement(conn, &stmt)
    }

    fn try_fill_all<R, F>(&mut self, factory: F) -> Result<Vec<R>>
    where
        R: Record,
        F: FnMut() -> R,
    {
        let conn = self.conn()?;
        if !inspect::table_exists(conn, R::table_name())? {
            return Ok(Vec::new());
        }
        mapper::fill_all(conn, factory)
    }
}

/// Converts a codec value to the driver's owned value type for binding.
fn bind_value(value: &rowmap_core::SqlValue) -> rusqlite::types::Value {
    match value {
        rowmap_core::SqlValue::Integer(i) => rusqlite::types::Value::Integer(*i),
        rowmap_core::SqlValue::Real(r) => rusqlite::types::Value::Real(*r),
        rowmap_core::SqlValue::Text(s) => rusqlite::types::Value::Text(s.clone()),
    }
}

/// Prepares a generated statement, binds its named parameters, and
/// executes it, returning the affected row count.
fn execute_statement(conn: &Connection, stmt: &Statement) -> Result<usize> {
    let mut prepared = conn.prepare(&stmt.text)?;
    for (name, value) in &stmt.params {
        let index = prepared
            .parameter_index(name)?
            .ok_or_else(|| StoreError::UnboundParameter(name.clone()))?;
        prepared.raw_bind_parameter(index, bind_value(value))?;
    }
    let affected = prepared.raw_execute()?;
    Ok(affected)
}
