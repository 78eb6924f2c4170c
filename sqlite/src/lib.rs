//! SQLite mapping engine for typed records.
//!
//! This crate turns the declarative record schemas of [`rowmap_core`] into
//! executed SQL against a SQLite database, with no hand-written statements:
//!
//! - **`command`** — CREATE/INSERT/UPDATE/DELETE synthesis from a record
//!   type's field set, with `@column` named parameters.
//! - **`inspect`** — live schema introspection (`sqlite_master`,
//!   `pragma_table_info`); the sole authority for "does this record fit
//!   this table".
//! - **`mapper`** — cursor-row-to-record population with default fallback
//!   and skip-bad-rows bulk loading.
//! - **`store`** — the [`RecordStore`] facade sequencing ensure/validate/
//!   generate/execute per operation over one lazily opened connection.
//!
//! # Quick start
//!
//! ```
//! use rowmap_core::{FieldSpec, Record, SemanticType, Value};
//! use rowmap_sqlite::RecordStore;
//!
//! #[derive(Default)]
//! struct Widget {
//!     id: Option<String>,
//!     count: Option<i64>,
//! }
//!
//! impl Record for Widget {
//!     fn table_name() -> &'static str {
//!         "widgets"
//!     }
//!     fn fields() -> Vec<FieldSpec> {
//!         vec![
//!             FieldSpec::new("id", SemanticType::Text).primary_key(),
//!             FieldSpec::new("count", SemanticType::Int32),
//!         ]
//!     }
//!     fn get(&self, field: &str) -> Option<Value> {
//!         match field {
//!             "id" => self.id.clone().map(Value::Text),
//!             "count" => self.count.map(Value::Integer),
//!             _ => None,
//!         }
//!     }
//!     fn set(&mut self, field: &str, value: Value) -> bool {
//!         match (field, value) {
//!             ("id", Value::Text(s)) => {
//!                 self.id = Some(s);
//!                 true
//!             }
//!             ("count", Value::Integer(i)) => {
//!                 self.count = Some(i);
//!                 true
//!             }
//!             _ => false,
//!         }
//!     }
//! }
//!
//! let mut store = RecordStore::open_in_memory();
//! let widget = Widget {
//!     id: Some("a1".to_string()),
//!     count: Some(5),
//! };
//! assert!(store.add(&widget));
//! let all: Vec<Widget> = store.load_all();
//! assert_eq!(all.len(), 1);
//! ```
//!
//! # Failure surface
//!
//! Mutations return `bool`, reads return values-or-empty; causes are
//! emitted through `tracing` before being flattened. The layers underneath
//! ([`create_table`], [`fill`], the inspector functions) return explicit
//! [`Result`]s for callers who need them.

mod command;
mod error;
mod inspect;
mod mapper;
mod store;

pub use command::{create_table, delete, insert, update, DeleteScope, Statement};
pub use error::{Result, StoreError};
pub use inspect::{columns, table_exists, tables, ColumnInfo};
pub use mapper::{fill, fill_all};
pub use store::{RecordStore, StoreOptions};
