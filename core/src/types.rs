//! Semantic type tags and their mapping to SQL storage classes.
//!
//! Every mapped field declares a [`SemanticType`] describing its native
//! shape. [`classify`] reduces that tag to one of SQLite's three storage
//! classes and, for sequence fields, records the element type so the codec
//! can reconstruct collections losslessly.

use serde::{Deserialize, Serialize};

/// SQL storage class a column is declared with.
///
/// # Examples
///
/// ```
/// use rowmap_core::StorageClass;
///
/// assert_eq!(StorageClass::Integer.as_sql(), "INTEGER");
/// assert_eq!(StorageClass::Text.as_sql(), "TEXT");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageClass {
    /// Whole numbers, booleans, bytes.
    Integer,
    /// Floating point numbers.
    Real,
    /// Strings, date-times, encoded sequences.
    Text,
}

impl StorageClass {
    /// Returns the SQL keyword used in column definitions.
    pub fn as_sql(self) -> &'static str {
        match self {
            StorageClass::Integer => "INTEGER",
            StorageClass::Real => "REAL",
            StorageClass::Text => "TEXT",
        }
    }
}

impl std::fmt::Display for StorageClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Semantic type tag declared per field.
///
/// Distinguishes the integer widths and date-times even though they share a
/// storage class, because decoding coerces back to the declared shape.
///
/// # Examples
///
/// ```
/// use rowmap_core::{classify, SemanticType, StorageClass};
///
/// let tags = SemanticType::Sequence(Box::new(SemanticType::Int32));
/// let c = classify(&tags);
/// assert_eq!(c.storage, StorageClass::Text);
/// assert!(c.is_sequence());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SemanticType {
    /// Boolean, stored as 0/1.
    Boolean,
    /// Unsigned 8-bit integer.
    Byte,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// 64-bit floating point.
    Double,
    /// UTF-8 string.
    Text,
    /// Point in time, stored as RFC 3339 text.
    DateTime,
    /// Ordered collection of the given element type, stored as an
    /// `ARR|`-enveloped JSON array in a TEXT column.
    Sequence(Box<SemanticType>),
}

/// Result of classifying a [`SemanticType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'a> {
    /// Storage class the column is declared with.
    pub storage: StorageClass,
    /// Declared element type when the field is a sequence.
    pub element: Option<&'a SemanticType>,
}

impl Classification<'_> {
    /// Whether the classified field needs the sequence envelope.
    pub fn is_sequence(&self) -> bool {
        self.element.is_some()
    }
}

/// Maps a semantic type tag to its SQL storage class.
///
/// Booleans, bytes, and both integer widths share INTEGER; doubles map to
/// REAL; everything else — strings, date-times, and sequences of any
/// element type — is stored as TEXT. Pure function of the tag.
pub fn classify(ty: &SemanticType) -> Classification<'_> {
    match ty {
        SemanticType::Boolean
        | SemanticType::Byte
        | SemanticType::Int32
        | SemanticType::Int64 => Classification {
            storage: StorageClass::Integer,
            element: None,
        },
        SemanticType::Double => Classification {
            storage: StorageClass::Real,
            element: None,
        },
        SemanticType::Text | SemanticType::DateTime => Classification {
            storage: StorageClass::Text,
            element: None,
        },
        SemanticType::Sequence(element) => Classification {
            storage: StorageClass::Text,
            element: Some(element),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_types_classify_as_integer() {
        for ty in [
            SemanticType::Boolean,
            SemanticType::Byte,
            SemanticType::Int32,
            SemanticType::Int64,
        ] {
            let c = classify(&ty);
            assert_eq!(c.storage, StorageClass::Integer);
            assert!(!c.is_sequence());
        }
    }

    #[test]
    fn test_double_classifies_as_real() {
        assert_eq!(classify(&SemanticType::Double).storage, StorageClass::Real);
    }

    #[test]
    fn test_text_and_datetime_classify_as_text() {
        assert_eq!(classify(&SemanticType::Text).storage, StorageClass::Text);
        assert_eq!(classify(&SemanticType::DateTime).storage, StorageClass::Text);
    }

    #[test]
    fn test_sequence_records_element_type() {
        let ty = SemanticType::Sequence(Box::new(SemanticType::Int64));
        let c = classify(&ty);
        assert_eq!(c.storage, StorageClass::Text);
        assert_eq!(c.element, Some(&SemanticType::Int64));
    }

    #[test]
    fn test_nested_sequence_still_classifies_as_text() {
        let inner = SemanticType::Sequence(Box::new(SemanticType::Text));
        let ty = SemanticType::Sequence(Box::new(inner.clone()));
        let c = classify(&ty);
        assert_eq!(c.storage, StorageClass::Text);
        assert_eq!(c.element, Some(&inner));
    }
}
