//! Driver-independent model layer for the rowmap mapping engine.
//!
//! This crate defines what a mapped record *is* and how its values travel
//! to and from storage, without depending on any database driver:
//!
//! - [`Record`] and [`FieldSpec`] — the declarative per-type schema
//!   description (field names, semantic types, constraint flags, defaults).
//! - [`SemanticType`], [`StorageClass`], and [`classify`] — the pure mapping
//!   from a field's native shape to its SQL storage class.
//! - [`Value`], [`SqlValue`], [`encode`], and [`decode`] — the bidirectional
//!   value codec, including the `ARR|<json-array>` envelope that stores
//!   ordered collections in a single TEXT column.
//!
//! The SQLite engine in `rowmap-sqlite` consumes these types to synthesize
//! and execute statements.
//!
//! # Example
//!
//! ```
//! use rowmap_core::{classify, encode, SemanticType, SqlValue, StorageClass, Value};
//!
//! let tags = SemanticType::Sequence(Box::new(SemanticType::Int32));
//! assert_eq!(classify(&tags).storage, StorageClass::Text);
//!
//! let (_, stored) = encode(&Value::Sequence(vec![
//!     Value::Integer(1),
//!     Value::Integer(2),
//! ]))
//! .unwrap();
//! assert_eq!(stored, SqlValue::Text("ARR|[1,2]".to_string()));
//! ```

mod error;
mod record;
mod types;
mod value;

pub use error::{CodecError, Result};
pub use record::{primary_key_field, FieldSpec, Record};
pub use types::{classify, Classification, SemanticType, StorageClass};
pub use value::{decode, encode, SqlValue, Value, SEQUENCE_PREFIX};
