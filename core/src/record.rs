//! The declarative record schema: the [`Record`] trait and [`FieldSpec`].
//!
//! Each mapped type enumerates its fields once, declaratively, instead of
//! being inspected reflectively at run time. A bare
//! [`FieldSpec::new`] carries no constraints: all flags false, no default,
//! column name equal to the field name. Builder methods layer the rest on.
//!
//! # Example
//!
//! ```
//! use rowmap_core::{FieldSpec, Record, SemanticType, Value};
//!
//! #[derive(Default)]
//! struct Task {
//!     id: Option<String>,
//!     priority: Option<i64>,
//! }
//!
//! impl Record for Task {
//!     fn table_name() -> &'static str {
//!         "tasks"
//!     }
//!
//!     fn fields() -> Vec<FieldSpec> {
//!         vec![
//!             FieldSpec::new("id", SemanticType::Text).primary_key(),
//!             FieldSpec::new("priority", SemanticType::Int64).with_default(Value::Integer(0)),
//!         ]
//!     }
//!
//!     fn get(&self, field: &str) -> Option<Value> {
//!         match field {
//!             "id" => self.id.clone().map(Value::Text),
//!             "priority" => self.priority.map(Value::Integer),
//!             _ => None,
//!         }
//!     }
//!
//!     fn set(&mut self, field: &str, value: Value) -> bool {
//!         match (field, value) {
//!             ("id", Value::Text(s)) => {
//!                 self.id = Some(s);
//!                 true
//!             }
//!             ("priority", Value::Integer(i)) => {
//!                 self.priority = Some(i);
//!                 true
//!             }
//!             _ => false,
//!         }
//!     }
//! }
//!
//! let spec = &Task::fields()[0];
//! assert!(spec.primary_key);
//! assert_eq!(spec.column_name(), "id");
//! ```

use crate::types::SemanticType;
use crate::value::Value;

/// Declarative metadata for one mapped field.
///
/// Derived once per record type per operation and immutable for its
/// duration. The column name defaults to the field name unless overridden
/// with [`with_column`](FieldSpec::with_column).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Field name as used with [`Record::get`] / [`Record::set`].
    pub name: &'static str,
    /// Declared semantic type.
    pub semantic: SemanticType,
    /// Whether this field identifies the row for update/delete targeting.
    pub primary_key: bool,
    /// Whether the column is declared NOT NULL.
    pub not_null: bool,
    /// Ignored fields never become columns and never participate in
    /// statements.
    pub ignored: bool,
    /// Declared default, applied on table creation and as a fill fallback.
    pub default: Option<Value>,
    /// Explicit column name override.
    pub column: Option<&'static str>,
}

impl FieldSpec {
    /// Creates a field with no constraints: all flags false, no default,
    /// column name equal to the field name.
    pub fn new(name: &'static str, semantic: SemanticType) -> Self {
        Self {
            name,
            semantic,
            primary_key: false,
            not_null: false,
            ignored: false,
            default: None,
            column: None,
        }
    }

    /// Marks this field as the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Declares the column NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Excludes this field from mapping entirely.
    #[must_use]
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    /// Declares a default value. Its storage class must agree with the
    /// field's own, which table creation verifies.
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Overrides the column name.
    #[must_use]
    pub fn with_column(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }

    /// Resolves the column name: the explicit override, or the field name.
    pub fn column_name(&self) -> &str {
        self.column.unwrap_or(self.name)
    }
}

/// A structural type whose instances map to rows of one table.
///
/// `get` returning `None` models a null runtime value — such fields are
/// omitted from generated statements rather than bound as SQL NULL. `set`
/// returns `false` for unknown field names or value shapes the type cannot
/// hold; callers treat that as a non-fatal miss.
pub trait Record {
    /// Table the type maps to. Defaults conventionally to the type's name,
    /// but any valid identifier works.
    fn table_name() -> &'static str;

    /// The declared field set, in statement-generation order.
    fn fields() -> Vec<FieldSpec>;

    /// Current value of the named field, or `None` when null.
    fn get(&self, field: &str) -> Option<Value>;

    /// Assigns the named field. Returns `false` when the field is unknown
    /// or the value shape does not fit.
    fn set(&mut self, field: &str, value: Value) -> bool;
}

/// Returns the primary-key field of a declared field set, if any.
///
/// Uniqueness is not checked here; the command generator rejects types
/// declaring more than one key.
pub fn primary_key_field(fields: &[FieldSpec]) -> Option<&FieldSpec> {
    fields.iter().find(|f| f.primary_key && !f.ignored)
}
