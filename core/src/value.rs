//! Native values and the bidirectional SQL value codec.
//!
//! [`encode`] turns a native [`Value`] into its storable [`SqlValue`] form;
//! [`decode`] performs the reverse given the declared target type. Sequences
//! travel through a compact textual envelope: each element is serialized to
//! its canonical JSON form, the elements are assembled into a JSON array,
//! and the result is prefixed with `ARR|` and stored in a TEXT column.
//!
//! Decoding is deliberately lenient: malformed stored data, a missing
//! envelope prefix, or a failed coercion all yield `None` rather than an
//! error, so a row fill can fall back to a declared default or simply leave
//! the field unset. Encoding failures are real errors — they abort the
//! enclosing statement generation.

use chrono::{DateTime, Utc};

use crate::error::{CodecError, Result};
use crate::types::{classify, SemanticType, StorageClass};

/// Marker prefixed to the JSON array form of a stored sequence.
pub const SEQUENCE_PREFIX: &str = "ARR|";

/// A native field value.
///
/// [`Record::get`](crate::Record::get) returns these; `None` at that level
/// models a null runtime value, so `Value` itself has no null variant.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Any integral value (boolean and byte fields widen to this on read).
    Integer(i64),
    /// 64-bit floating point.
    Real(f64),
    /// Boolean.
    Boolean(bool),
    /// UTF-8 string.
    Text(String),
    /// Point in time.
    DateTime(DateTime<Utc>),
    /// Ordered collection of scalar values.
    Sequence(Vec<Value>),
}

/// The SQL-storable representation of a value.
///
/// Null is absent on purpose: null-valued fields are omitted from generated
/// statements entirely rather than bound as SQL NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// INTEGER storage.
    Integer(i64),
    /// REAL storage.
    Real(f64),
    /// TEXT storage.
    Text(String),
}

/// Encodes a native value into its storage class and SQL representation.
///
/// Booleans become 0/1 integers; date-times become RFC 3339 text; sequences
/// become the `ARR|<json-array>` envelope. The encode fails atomically: a
/// single bad element poisons the whole sequence.
///
/// # Errors
///
/// Returns [`CodecError::NonFiniteReal`] for NaN or infinite reals and
/// [`CodecError::NestedSequence`] for sequence elements that are themselves
/// sequences.
///
/// # Examples
///
/// ```
/// use rowmap_core::{encode, SqlValue, StorageClass, Value};
///
/// let (storage, sql) = encode(&Value::Sequence(vec![
///     Value::Integer(1),
///     Value::Integer(2),
///     Value::Integer(3),
/// ]))
/// .unwrap();
/// assert_eq!(storage, StorageClass::Text);
/// assert_eq!(sql, SqlValue::Text("ARR|[1,2,3]".to_string()));
/// ```
pub fn encode(value: &Value) -> Result<(StorageClass, SqlValue)> {
    match value {
        Value::Boolean(b) => Ok((
            StorageClass::Integer,
            SqlValue::Integer(i64::from(*b)),
        )),
        Value::Integer(i) => Ok((StorageClass::Integer, SqlValue::Integer(*i))),
        Value::Real(r) => {
            if !r.is_finite() {
                return Err(CodecError::NonFiniteReal(*r));
            }
            Ok((StorageClass::Real, SqlValue::Real(*r)))
        }
        Value::Text(s) => Ok((StorageClass::Text, SqlValue::Text(s.clone()))),
        Value::DateTime(dt) => Ok((StorageClass::Text, SqlValue::Text(dt.to_rfc3339()))),
        Value::Sequence(items) => {
            let mut elements = Vec::with_capacity(items.len());
            for item in items {
                elements.push(encode_element(item)?);
            }
            let json = serde_json::Value::Array(elements);
            Ok((
                StorageClass::Text,
                SqlValue::Text(format!("{SEQUENCE_PREFIX}{json}")),
            ))
        }
    }
}

/// Serializes one sequence element to its canonical JSON form.
fn encode_element(item: &Value) -> Result<serde_json::Value> {
    match item {
        Value::Boolean(b) => Ok(serde_json::Value::from(i64::from(*b))),
        Value::Integer(i) => Ok(serde_json::Value::from(*i)),
        Value::Real(r) => serde_json::Number::from_f64(*r)
            .map(serde_json::Value::Number)
            .ok_or(CodecError::NonFiniteReal(*r)),
        Value::Text(s) => Ok(serde_json::Value::from(s.as_str())),
        Value::DateTime(dt) => Ok(serde_json::Value::from(dt.to_rfc3339())),
        Value::Sequence(_) => Err(CodecError::NestedSequence),
    }
}

/// Decodes a stored SQL value back to the declared target type.
///
/// Returns `None` whenever the value cannot be coerced: the caller falls
/// back to a declared default or leaves the field unset. Empty text is
/// treated the same as SQL NULL — no value. Boolean decoding follows the
/// stored convention exactly: literal `1` (or `"1"`) is true, anything
/// else is false.
///
/// # Examples
///
/// ```
/// use rowmap_core::{decode, SemanticType, SqlValue, Value};
///
/// let tags = SemanticType::Sequence(Box::new(SemanticType::Int32));
/// let raw = SqlValue::Text("ARR|[3,1,4]".to_string());
/// let decoded = decode(&raw, &tags).unwrap();
/// assert_eq!(
///     decoded,
///     Value::Sequence(vec![
///         Value::Integer(3),
///         Value::Integer(1),
///         Value::Integer(4),
///     ])
/// );
///
/// // Missing envelope prefix: no value, not an error.
/// assert_eq!(decode(&SqlValue::Text("[3,1,4]".into()), &tags), None);
/// ```
pub fn decode(raw: &SqlValue, target: &SemanticType) -> Option<Value> {
    if let SqlValue::Text(s) = raw {
        if s.is_empty() {
            return None;
        }
    }

    match target {
        SemanticType::Boolean => Some(Value::Boolean(decode_boolean(raw))),
        SemanticType::Byte => {
            let i = decode_integer(raw)?;
            u8::try_from(i).ok().map(|_| Value::Integer(i))
        }
        SemanticType::Int32 => {
            let i = decode_integer(raw)?;
            i32::try_from(i).ok().map(|_| Value::Integer(i))
        }
        SemanticType::Int64 => decode_integer(raw).map(Value::Integer),
        SemanticType::Double => match raw {
            SqlValue::Integer(i) => Some(Value::Real(*i as f64)),
            SqlValue::Real(r) => Some(Value::Real(*r)),
            SqlValue::Text(s) => s.trim().parse::<f64>().ok().map(Value::Real),
        },
        SemanticType::Text => Some(Value::Text(match raw {
            SqlValue::Integer(i) => i.to_string(),
            SqlValue::Real(r) => r.to_string(),
            SqlValue::Text(s) => s.clone(),
        })),
        SemanticType::DateTime => match raw {
            SqlValue::Text(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| Value::DateTime(dt.with_timezone(&Utc))),
            _ => None,
        },
        SemanticType::Sequence(element) => decode_sequence(raw, element),
    }
}

/// Stored `1` (or `"1"`) is true, anything else is false.
fn decode_boolean(raw: &SqlValue) -> bool {
    match raw {
        SqlValue::Integer(i) => *i == 1,
        SqlValue::Text(s) => s == "1",
        SqlValue::Real(_) => false,
    }
}

fn decode_integer(raw: &SqlValue) -> Option<i64> {
    match raw {
        SqlValue::Integer(i) => Some(*i),
        SqlValue::Text(s) => s.trim().parse::<i64>().ok(),
        // Reals coerce only when finite, integral, and inside i64 range.
        // The upper bound is exclusive: i64::MAX as f64 rounds up to 2^63,
        // which is already out of range and would saturate the cast.
        SqlValue::Real(r) => {
            if r.is_finite()
                && r.fract() == 0.0
                && *r >= i64::MIN as f64
                && *r < i64::MAX as f64
            {
                Some(*r as i64)
            } else {
                None
            }
        }
    }
}

/// Unwraps the `ARR|` envelope and deserializes each element to the
/// declared element type. Any failure — missing prefix, invalid JSON, a
/// non-array body, or a single undecodable element — drops the whole value.
fn decode_sequence(raw: &SqlValue, element: &SemanticType) -> Option<Value> {
    let SqlValue::Text(text) = raw else {
        return None;
    };
    let body = text.strip_prefix(SEQUENCE_PREFIX)?;
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    let array = parsed.as_array()?;

    // Sequences of sequences are never produced by encode; reject them here
    // too so both directions agree.
    if classify(element).is_sequence() {
        return None;
    }

    let mut items = Vec::with_capacity(array.len());
    for entry in array {
        items.push(decode_json_element(entry, element)?);
    }
    Some(Value::Sequence(items))
}

/// Deserializes one JSON array entry to the declared element type.
fn decode_json_element(entry: &serde_json::Value, element: &SemanticType) -> Option<Value> {
    match element {
        SemanticType::Boolean => Some(Value::Boolean(match entry {
            serde_json::Value::Number(n) => n.as_i64() == Some(1),
            serde_json::Value::String(s) => s == "1",
            serde_json::Value::Bool(b) => *b,
            _ => false,
        })),
        SemanticType::Byte | SemanticType::Int32 | SemanticType::Int64 => {
            let i = match entry {
                serde_json::Value::Number(n) => n.as_i64(),
                serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }?;
            match element {
                SemanticType::Byte => u8::try_from(i).ok().map(|_| Value::Integer(i)),
                SemanticType::Int32 => i32::try_from(i).ok().map(|_| Value::Integer(i)),
                _ => Some(Value::Integer(i)),
            }
        }
        SemanticType::Double => match entry {
            serde_json::Value::Number(n) => n.as_f64().map(Value::Real),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok().map(Value::Real),
            _ => None,
        },
        SemanticType::Text => match entry {
            serde_json::Value::String(s) => Some(Value::Text(s.clone())),
            serde_json::Value::Number(n) => Some(Value::Text(n.to_string())),
            _ => None,
        },
        SemanticType::DateTime => entry.as_str().and_then(|s| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| Value::DateTime(dt.with_timezone(&Utc)))
        }),
        SemanticType::Sequence(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_encode_boolean_as_integer() {
        assert_eq!(
            encode(&Value::Boolean(true)).unwrap(),
            (StorageClass::Integer, SqlValue::Integer(1))
        );
        assert_eq!(
            encode(&Value::Boolean(false)).unwrap(),
            (StorageClass::Integer, SqlValue::Integer(0))
        );
    }

    #[test]
    fn test_encode_datetime_as_rfc3339_text() {
        let dt = Utc.with_ymd_and_hms(2024, 5, 17, 12, 30, 0).unwrap();
        let (storage, sql) = encode(&Value::DateTime(dt)).unwrap();
        assert_eq!(storage, StorageClass::Text);
        assert_eq!(sql, SqlValue::Text("2024-05-17T12:30:00+00:00".to_string()));
    }

    #[test]
    fn test_encode_non_finite_real_fails() {
        assert!(encode(&Value::Real(f64::NAN)).is_err());
        assert!(encode(&Value::Real(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_encode_sequence_envelope() {
        let (_, sql) = encode(&Value::Sequence(vec![
            Value::Integer(3),
            Value::Integer(1),
            Value::Integer(4),
            Value::Integer(1),
            Value::Integer(5),
        ]))
        .unwrap();
        assert_eq!(sql, SqlValue::Text("ARR|[3,1,4,1,5]".to_string()));
    }

    #[test]
    fn test_encode_text_sequence_quotes_elements() {
        let (_, sql) = encode(&Value::Sequence(vec![
            Value::Text("a".into()),
            Value::Text("b".into()),
        ]))
        .unwrap();
        assert_eq!(sql, SqlValue::Text(r#"ARR|["a","b"]"#.to_string()));
    }

    #[test]
    fn test_encode_nested_sequence_fails() {
        let nested = Value::Sequence(vec![Value::Sequence(vec![Value::Integer(1)])]);
        assert!(matches!(encode(&nested), Err(CodecError::NestedSequence)));
    }

    #[test]
    fn test_sequence_round_trip_preserves_order() {
        let original = Value::Sequence(vec![
            Value::Integer(3),
            Value::Integer(1),
            Value::Integer(4),
            Value::Integer(1),
            Value::Integer(5),
        ]);
        let (_, sql) = encode(&original).unwrap();
        let target = SemanticType::Sequence(Box::new(SemanticType::Int32));
        assert_eq!(decode(&sql, &target), Some(original));
    }

    #[test]
    fn test_decode_sequence_without_prefix_yields_none() {
        let target = SemanticType::Sequence(Box::new(SemanticType::Int32));
        assert_eq!(decode(&SqlValue::Text("[1,2,3]".into()), &target), None);
    }

    #[test]
    fn test_decode_sequence_malformed_json_yields_none() {
        let target = SemanticType::Sequence(Box::new(SemanticType::Int32));
        assert_eq!(decode(&SqlValue::Text("ARR|[1,2,".into()), &target), None);
        assert_eq!(decode(&SqlValue::Text("ARR|{}".into()), &target), None);
    }

    #[test]
    fn test_decode_sequence_bad_element_drops_whole_value() {
        let target = SemanticType::Sequence(Box::new(SemanticType::Int32));
        assert_eq!(
            decode(&SqlValue::Text(r#"ARR|[1,"x",3]"#.into()), &target),
            None
        );
    }

    #[test]
    fn test_decode_boolean_literal_one_only() {
        assert_eq!(
            decode(&SqlValue::Integer(1), &SemanticType::Boolean),
            Some(Value::Boolean(true))
        );
        assert_eq!(
            decode(&SqlValue::Integer(0), &SemanticType::Boolean),
            Some(Value::Boolean(false))
        );
        assert_eq!(
            decode(&SqlValue::Integer(5), &SemanticType::Boolean),
            Some(Value::Boolean(false))
        );
        assert_eq!(
            decode(&SqlValue::Text("1".into()), &SemanticType::Boolean),
            Some(Value::Boolean(true))
        );
        assert_eq!(
            decode(&SqlValue::Text("true".into()), &SemanticType::Boolean),
            Some(Value::Boolean(false))
        );
    }

    #[test]
    fn test_decode_integer_from_text() {
        assert_eq!(
            decode(&SqlValue::Text("42".into()), &SemanticType::Int64),
            Some(Value::Integer(42))
        );
        assert_eq!(
            decode(&SqlValue::Text("garbage".into()), &SemanticType::Int64),
            None
        );
    }

    #[test]
    fn test_decode_integer_range_enforced() {
        assert_eq!(decode(&SqlValue::Integer(300), &SemanticType::Byte), None);
        assert_eq!(
            decode(&SqlValue::Integer(i64::MAX), &SemanticType::Int32),
            None
        );
        assert_eq!(
            decode(&SqlValue::Integer(255), &SemanticType::Byte),
            Some(Value::Integer(255))
        );
    }

    #[test]
    fn test_decode_integer_from_real_only_when_integral() {
        assert_eq!(
            decode(&SqlValue::Real(4.0), &SemanticType::Int64),
            Some(Value::Integer(4))
        );
        assert_eq!(decode(&SqlValue::Real(4.5), &SemanticType::Int64), None);
    }

    #[test]
    fn test_decode_integer_from_real_rejects_out_of_range() {
        assert_eq!(decode(&SqlValue::Real(1e300), &SemanticType::Int64), None);
        assert_eq!(decode(&SqlValue::Real(-1e300), &SemanticType::Int64), None);
        // Exactly 2^63 is integral but one past i64::MAX.
        assert_eq!(
            decode(&SqlValue::Real(9_223_372_036_854_775_808.0), &SemanticType::Int64),
            None
        );
        assert_eq!(
            decode(&SqlValue::Real(i64::MIN as f64), &SemanticType::Int64),
            Some(Value::Integer(i64::MIN))
        );
    }

    #[test]
    fn test_decode_empty_text_yields_none_for_every_target() {
        let empty = SqlValue::Text(String::new());
        assert_eq!(decode(&empty, &SemanticType::Text), None);
        assert_eq!(decode(&empty, &SemanticType::Int64), None);
        assert_eq!(decode(&empty, &SemanticType::Boolean), None);
    }

    #[test]
    fn test_decode_datetime_round_trip() {
        let dt = Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap();
        let (_, sql) = encode(&Value::DateTime(dt)).unwrap();
        assert_eq!(
            decode(&sql, &SemanticType::DateTime),
            Some(Value::DateTime(dt))
        );
        assert_eq!(
            decode(&SqlValue::Text("not a date".into()), &SemanticType::DateTime),
            None
        );
    }

    #[test]
    fn test_decode_text_coerces_numerics() {
        assert_eq!(
            decode(&SqlValue::Integer(7), &SemanticType::Text),
            Some(Value::Text("7".to_string()))
        );
    }

    #[test]
    fn test_boolean_sequence_round_trip() {
        let original = Value::Sequence(vec![Value::Boolean(true), Value::Boolean(false)]);
        let (_, sql) = encode(&original).unwrap();
        assert_eq!(sql, SqlValue::Text("ARR|[1,0]".to_string()));
        let target = SemanticType::Sequence(Box::new(SemanticType::Boolean));
        assert_eq!(decode(&sql, &target), Some(original));
    }
}
