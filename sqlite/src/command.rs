//! Statement synthesis from declared record schemas.
//!
//! Composes the classifier and the declarative field set into parameterized
//! CREATE/INSERT/UPDATE/DELETE text. Statement text and parameter order are
//! a pure function of the declared field order and the instance's values —
//! repeated generation for the same record type is idempotent in shape.
//!
//! Placeholders are derived one-to-one from column names with an `@`
//! prefix, so `count` binds as `@count`.

use rowmap_core::{classify, encode, primary_key_field, FieldSpec, Record, SqlValue};

use crate::error::{Result, StoreError};
use crate::inspect::validate_identifier;

/// A generated statement: SQL text plus its ordered named parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Statement text with `@column` placeholders.
    pub text: String,
    /// Placeholder name (including the `@` prefix) to bound value, in
    /// generation order.
    pub params: Vec<(String, SqlValue)>,
}

/// Row-matching strategy for generated DELETE statements.
///
/// The default matches the exact row state: every non-null field
/// participates in the WHERE clause. `PrimaryKey` narrows the match to
/// identity for callers who want a delete to survive out-of-band changes
/// to non-key columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum DeleteScope {
    /// Match every eligible field (the default).
    #[default]
    FullRow,
    /// Match the primary-key column only.
    PrimaryKey,
}

fn placeholder(column: &str) -> String {
    format!("@{column}")
}

/// Renders a default value as a SQL literal for a column definition.
fn default_literal(value: &SqlValue) -> String {
    match value {
        SqlValue::Integer(i) => i.to_string(),
        SqlValue::Real(r) => r.to_string(),
        SqlValue::Text(s) => format!("'{}'", s.replace('\'', "''")),
    }
}

/// The non-ignored fields of a record type, in declared order.
fn storable_fields<R: Record>() -> Vec<FieldSpec> {
    R::fields().into_iter().filter(|f| !f.ignored).collect()
}

/// Generates a CREATE TABLE statement for a record type.
///
/// Each non-ignored field becomes
/// `col TYPE [PRIMARY KEY][ DEFAULT <lit>][ NOT NULL]`.
///
/// # Errors
///
/// - [`StoreError::NoFields`] when the type has zero storable fields.
/// - [`StoreError::DuplicatePrimaryKey`] for more than one key field.
/// - [`StoreError::DuplicateColumn`] when two fields resolve to the same
///   column name.
/// - [`StoreError::DefaultTypeMismatch`] when a declared default's storage
///   class disagrees with its column's.
/// - [`StoreError::InvalidIdentifier`] for malformed table/column names.
///
/// # Examples
///
/// ```
/// use rowmap_core::{FieldSpec, Record, SemanticType, Value};
/// use rowmap_sqlite::create_table;
///
/// struct Widget;
///
/// impl Record for Widget {
///     fn table_name() -> &'static str {
///         "widgets"
///     }
///     fn fields() -> Vec<FieldSpec> {
///         vec![
///             FieldSpec::new("id", SemanticType::Text).primary_key(),
///             FieldSpec::new("count", SemanticType::Int32).with_default(Value::Integer(7)),
///         ]
///     }
///     fn get(&self, _: &str) -> Option<Value> {
///         None
///     }
///     fn set(&mut self, _: &str, _: Value) -> bool {
///         false
///     }
/// }
///
/// let stmt = create_table::<Widget>().unwrap();
/// assert_eq!(
///     stmt.text,
///     "CREATE TABLE widgets(id TEXT PRIMARY KEY, count INTEGER DEFAULT 7)"
/// );
/// ```
pub fn create_table<R: Record>() -> Result<Statement> {
    let table = R::table_name();
    validate_identifier(table)?;

    let fields = storable_fields::<R>();
    if fields.is_empty() {
        return Err(StoreError::NoFields(table.to_string()));
    }
    if fields.iter().filter(|f| f.primary_key).count() > 1 {
        return Err(StoreError::DuplicatePrimaryKey(table.to_string()));
    }

    let mut seen = std::collections::HashSet::new();
    let mut defs = Vec::with_capacity(fields.len());
    for field in &fields {
        let column = field.column_name();
        validate_identifier(column)?;
        if !seen.insert(column) {
            return Err(StoreError::DuplicateColumn {
                table: table.to_string(),
                column: column.to_string(),
            });
        }
        let storage = classify(&field.semantic).storage;

        let mut def = format!("{column} {storage}");
        if field.primary_key {
            def.push_str(" PRIMARY KEY");
        }
        if let Some(default) = &field.default {
            let (default_storage, sql) = encode(default)?;
            if default_storage != storage {
                return Err(StoreError::DefaultTypeMismatch(column.to_string()));
            }
            def.push_str(" DEFAULT ");
            def.push_str(&default_literal(&sql));
        }
        if field.not_null {
            def.push_str(" NOT NULL");
        }
        defs.push(def);
    }

    Ok(Statement {
        text: format!("CREATE TABLE {table}({})", defs.join(", ")),
        params: Vec::new(),
    })
}

/// Generates an INSERT statement from a record instance.
///
/// Null-valued fields are omitted entirely — never bound as SQL NULL — so
/// a record with no non-null eligible fields produces the reduced form
/// `INSERT INTO t DEFAULT VALUES`.
///
/// # Errors
///
/// Any field whose value fails encoding aborts the whole statement; no
/// partial text is produced.
pub fn insert<R: Record>(record: &R) -> Result<Statement> {
    let table = R::table_name();
    validate_identifier(table)?;

    let mut columns = Vec::new();
    let mut placeholders = Vec::new();
    let mut params = Vec::new();
    for field in storable_fields::<R>() {
        let Some(value) = record.get(field.name) else {
            continue;
        };
        let column = field.column_name();
        validate_identifier(column)?;
        let (_, sql) = encode(&value)?;
        columns.push(column.to_string());
        placeholders.push(placeholder(column));
        params.push((placeholder(column), sql));
    }

    let text = if columns.is_empty() {
        format!("INSERT INTO {table} DEFAULT VALUES")
    } else {
        format!(
            "INSERT INTO {table}({}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        )
    };
    Ok(Statement { text, params })
}

/// Generates an UPDATE statement targeting the record's primary key.
///
/// Non-key fields with non-null values form the SET list; the key column
/// forms the WHERE clause.
///
/// # Errors
///
/// - [`StoreError::MissingPrimaryKey`] when no key is declared or its
///   value is null.
/// - [`StoreError::EmptyUpdate`] when every SET-eligible field is null.
/// - Encoding failures abort the whole statement.
pub fn update<R: Record>(record: &R) -> Result<Statement> {
    let table = R::table_name();
    validate_identifier(table)?;

    let fields = storable_fields::<R>();
    let key = primary_key_field(&fields)
        .ok_or_else(|| StoreError::MissingPrimaryKey(table.to_string()))?;
    let key_value = record
        .get(key.name)
        .ok_or_else(|| StoreError::MissingPrimaryKey(table.to_string()))?;
    let key_column = key.column_name();
    validate_identifier(key_column)?;

    let mut assignments = Vec::new();
    let mut params = Vec::new();
    for field in fields.iter().filter(|f| !f.primary_key) {
        let Some(value) = record.get(field.name) else {
            continue;
        };
        let column = field.column_name();
        validate_identifier(column)?;
        let (_, sql) = encode(&value)?;
        assignments.push(format!("{column} = {}", placeholder(column)));
        params.push((placeholder(column), sql));
    }
    if assignments.is_empty() {
        return Err(StoreError::EmptyUpdate(table.to_string()));
    }

    let (_, key_sql) = encode(&key_value)?;
    params.push((placeholder(key_column), key_sql));

    Ok(Statement {
        text: format!(
            "UPDATE {table} SET {} WHERE {key_column} = {}",
            assignments.join(", "),
            placeholder(key_column)
        ),
        params,
    })
}

/// Generates a DELETE statement from a record instance.
///
/// With [`DeleteScope::FullRow`] the WHERE clause AND-joins an equality
/// test on every non-null field, matching the exact row state rather than
/// just identity. [`DeleteScope::PrimaryKey`] matches the key column only.
/// In both scopes a declared primary key with a non-null value is
/// required.
///
/// # Errors
///
/// - [`StoreError::MissingPrimaryKey`] when no key is declared or its
///   value is null.
/// - [`StoreError::EmptyDelete`] when no field is eligible to match.
/// - Encoding failures abort the whole statement.
pub fn delete<R: Record>(record: &R, scope: DeleteScope) -> Result<Statement> {
    let table = R::table_name();
    validate_identifier(table)?;

    let fields = storable_fields::<R>();
    let key = primary_key_field(&fields)
        .ok_or_else(|| StoreError::MissingPrimaryKey(table.to_string()))?;
    if record.get(key.name).is_none() {
        return Err(StoreError::MissingPrimaryKey(table.to_string()));
    }

    let matched: Vec<&FieldSpec> = match scope {
        DeleteScope::FullRow => fields.iter().collect(),
        DeleteScope::PrimaryKey => vec![key],
    };

    let mut conditions = Vec::new();
    let mut params = Vec::new();
    for field in matched {
        let Some(value) = record.get(field.name) else {
            continue;
        };
        let column = field.column_name();
        validate_identifier(column)?;
        let (_, sql) = encode(&value)?;
        conditions.push(format!("{column} = {}", placeholder(column)));
        params.push((placeholder(column), sql));
    }
    if conditions.is_empty() {
        return Err(StoreError::EmptyDelete(table.to_string()));
    }

    Ok(Statement {
        text: format!("DELETE FROM {table} WHERE {}", conditions.join(" AND ")),
        params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowmap_core::{SemanticType, Value};

    #[derive(Default)]
    struct Widget {
        id: Option<String>,
        count: Option<i64>,
        tags: Option<Vec<i64>>,
    }

    impl Record for Widget {
        fn table_name() -> &'static str {
            "widgets"
        }

        fn fields() -> Vec<FieldSpec> {
            vec![
                FieldSpec::new("id", SemanticType::Text).primary_key(),
                FieldSpec::new("count", SemanticType::Int32),
                FieldSpec::new(
                    "tags",
                    SemanticType::Sequence(Box::new(SemanticType::Int32)),
                ),
                FieldSpec::new("scratch", SemanticType::Text).ignored(),
            ]
        }

        fn get(&self, field: &str) -> Option<Value> {
            match field {
                "id" => self.id.clone().map(Value::Text),
                "count" => self.count.map(Value::Integer),
                "tags" => self
                    .tags
                    .clone()
                    .map(|t| Value::Sequence(t.into_iter().map(Value::Integer).collect())),
                _ => None,
            }
        }

        fn set(&mut self, _: &str, _: Value) -> bool {
            false
        }
    }

    fn widget() -> Widget {
        Widget {
            id: Some("a1".to_string()),
            count: Some(5),
            tags: Some(vec![1, 2, 3]),
        }
    }

    #[test]
    fn test_create_table_text() {
        let stmt = create_table::<Widget>().unwrap();
        assert_eq!(
            stmt.text,
            "CREATE TABLE widgets(id TEXT PRIMARY KEY, count INTEGER, tags TEXT)"
        );
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_create_table_rejects_zero_fields() {
        struct Empty;
        impl Record for Empty {
            fn table_name() -> &'static str {
                "empties"
            }
            fn fields() -> Vec<FieldSpec> {
                vec![FieldSpec::new("hidden", SemanticType::Text).ignored()]
            }
            fn get(&self, _: &str) -> Option<Value> {
                None
            }
            fn set(&mut self, _: &str, _: Value) -> bool {
                false
            }
        }
        assert!(matches!(
            create_table::<Empty>(),
            Err(StoreError::NoFields(_))
        ));
    }

    #[test]
    fn test_create_table_rejects_duplicate_primary_key() {
        struct TwoKeys;
        impl Record for TwoKeys {
            fn table_name() -> &'static str {
                "twokeys"
            }
            fn fields() -> Vec<FieldSpec> {
                vec![
                    FieldSpec::new("a", SemanticType::Int64).primary_key(),
                    FieldSpec::new("b", SemanticType::Int64).primary_key(),
                ]
            }
            fn get(&self, _: &str) -> Option<Value> {
                None
            }
            fn set(&mut self, _: &str, _: Value) -> bool {
                false
            }
        }
        assert!(matches!(
            create_table::<TwoKeys>(),
            Err(StoreError::DuplicatePrimaryKey(_))
        ));
    }

    #[test]
    fn test_create_table_rejects_colliding_column_names() {
        struct Clash;
        impl Record for Clash {
            fn table_name() -> &'static str {
                "clashes"
            }
            fn fields() -> Vec<FieldSpec> {
                vec![
                    FieldSpec::new("x", SemanticType::Int64),
                    FieldSpec::new("renamed", SemanticType::Text).with_column("x"),
                ]
            }
            fn get(&self, _: &str) -> Option<Value> {
                None
            }
            fn set(&mut self, _: &str, _: Value) -> bool {
                false
            }
        }
        assert!(matches!(
            create_table::<Clash>(),
            Err(StoreError::DuplicateColumn { .. })
        ));
    }

    #[test]
    fn test_create_table_rejects_default_type_mismatch() {
        struct BadDefault;
        impl Record for BadDefault {
            fn table_name() -> &'static str {
                "bad_defaults"
            }
            fn fields() -> Vec<FieldSpec> {
                vec![
                    FieldSpec::new("count", SemanticType::Int32)
                        .with_default(Value::Text("seven".to_string())),
                ]
            }
            fn get(&self, _: &str) -> Option<Value> {
                None
            }
            fn set(&mut self, _: &str, _: Value) -> bool {
                false
            }
        }
        assert!(matches!(
            create_table::<BadDefault>(),
            Err(StoreError::DefaultTypeMismatch(_))
        ));
    }

    #[test]
    fn test_create_table_renders_defaults_and_not_null() {
        struct Task;
        impl Record for Task {
            fn table_name() -> &'static str {
                "tasks"
            }
            fn fields() -> Vec<FieldSpec> {
                vec![
                    FieldSpec::new("id", SemanticType::Int64).primary_key(),
                    FieldSpec::new("title", SemanticType::Text)
                        .with_default(Value::Text("it's new".to_string()))
                        .not_null(),
                ]
            }
            fn get(&self, _: &str) -> Option<Value> {
                None
            }
            fn set(&mut self, _: &str, _: Value) -> bool {
                false
            }
        }
        let stmt = create_table::<Task>().unwrap();
        assert_eq!(
            stmt.text,
            "CREATE TABLE tasks(id INTEGER PRIMARY KEY, \
             title TEXT DEFAULT 'it''s new' NOT NULL)"
        );
    }

    #[test]
    fn test_insert_binds_each_non_null_field() {
        let stmt = insert(&widget()).unwrap();
        assert_eq!(
            stmt.text,
            "INSERT INTO widgets(id, count, tags) VALUES (@id, @count, @tags)"
        );
        assert_eq!(stmt.params.len(), 3);
        assert_eq!(
            stmt.params[2],
            (
                "@tags".to_string(),
                SqlValue::Text("ARR|[1,2,3]".to_string())
            )
        );
    }

    #[test]
    fn test_insert_skips_null_fields() {
        let mut w = widget();
        w.tags = None;
        let stmt = insert(&w).unwrap();
        assert_eq!(
            stmt.text,
            "INSERT INTO widgets(id, count) VALUES (@id, @count)"
        );
        assert_eq!(stmt.params.len(), 2);
    }

    #[test]
    fn test_insert_all_null_uses_default_values_form() {
        let stmt = insert(&Widget::default()).unwrap();
        assert_eq!(stmt.text, "INSERT INTO widgets DEFAULT VALUES");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_update_partitions_set_and_where() {
        let stmt = update(&widget()).unwrap();
        assert_eq!(
            stmt.text,
            "UPDATE widgets SET count = @count, tags = @tags WHERE id = @id"
        );
        // Key parameter is bound last.
        assert_eq!(stmt.params[2].0, "@id");
        assert_eq!(stmt.params[2].1, SqlValue::Text("a1".to_string()));
    }

    #[test]
    fn test_update_requires_primary_key_value() {
        let mut w = widget();
        w.id = None;
        assert!(matches!(
            update(&w),
            Err(StoreError::MissingPrimaryKey(_))
        ));
    }

    #[test]
    fn test_update_with_only_key_fails() {
        let mut w = widget();
        w.count = None;
        w.tags = None;
        assert!(matches!(update(&w), Err(StoreError::EmptyUpdate(_))));
    }

    #[test]
    fn test_delete_full_row_matches_every_field() {
        let stmt = delete(&widget(), DeleteScope::FullRow).unwrap();
        assert_eq!(
            stmt.text,
            "DELETE FROM widgets WHERE id = @id AND count = @count AND tags = @tags"
        );
        assert_eq!(stmt.params.len(), 3);
    }

    #[test]
    fn test_delete_key_scope_matches_key_only() {
        let stmt = delete(&widget(), DeleteScope::PrimaryKey).unwrap();
        assert_eq!(stmt.text, "DELETE FROM widgets WHERE id = @id");
        assert_eq!(stmt.params.len(), 1);
    }

    #[test]
    fn test_delete_requires_primary_key_value() {
        let mut w = widget();
        w.id = None;
        assert!(matches!(
            delete(&w, DeleteScope::FullRow),
            Err(StoreError::MissingPrimaryKey(_))
        ));
    }

    #[test]
    fn test_statement_shape_is_deterministic() {
        let a = insert(&widget()).unwrap();
        let b = insert(&widget()).unwrap();
        assert_eq!(a, b);
    }
}
