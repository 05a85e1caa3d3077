//! Type inference from sample values.
//!
//! Given a value observed in incoming data, `infer_type` proposes the
//! field-language type string a schema author would most likely write
//! for it. The output always parses back through
//! [`parse_type_string`](crate::parser::parse_type_string).

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}:\d{2}$").unwrap());

static DATETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:?\d{2})?$").unwrap()
});

/// A sample value to infer a type from.
///
/// This is the host-neutral shape: JSON converts losslessly via the
/// `From` impl, and hosts with richer values (raw bytes, native
/// timestamps) construct the binary and timestamp variants directly.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    /// An absent value; carries no type information.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating-point number.
    Float(f64),
    /// A text value.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// A native timestamp.
    Timestamp(DateTime<Utc>),
    /// A list of values.
    List(Vec<SampleValue>),
    /// A keyed object.
    Object(Vec<(String, SampleValue)>),
}

impl From<&serde_json::Value> for SampleValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i)
                } else {
                    Self::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Self::Text(s.clone()),
            serde_json::Value::Array(items) => {
                Self::List(items.iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Object(
                map.iter().map(|(k, v)| (k.clone(), Self::from(v))).collect(),
            ),
        }
    }
}

/// Infers the field-language type string for a sample value.
///
/// Strings are sniffed for UUID, date, time, and timestamp shapes
/// before falling back to `string`. Integers outside the 32-bit range
/// widen to `bigint`. Lists take the element type of their first
/// non-null element, or `json[]` when empty or null-leading.
#[must_use]
pub fn infer_type(value: &SampleValue) -> String {
    match value {
        SampleValue::Null => "json?".to_string(),
        SampleValue::Bool(_) => "bool".to_string(),
        SampleValue::Int(i) => integer_type(*i).to_string(),
        SampleValue::Float(f) => {
            if f.fract() == 0.0 && f.is_finite() {
                #[allow(clippy::cast_possible_truncation)]
                integer_type(*f as i64).to_string()
            } else {
                "float".to_string()
            }
        }
        SampleValue::Text(s) => text_type(s).to_string(),
        SampleValue::Bytes(_) => "binary".to_string(),
        SampleValue::Timestamp(_) => "timestamp".to_string(),
        SampleValue::List(items) => match items.iter().find(|i| **i != SampleValue::Null) {
            None => "json[]".to_string(),
            Some(first) => format!("{}[]", infer_type(first)),
        },
        SampleValue::Object(_) => "json".to_string(),
    }
}

fn integer_type(i: i64) -> &'static str {
    if i64::from(i32::MIN) <= i && i <= i64::from(i32::MAX) {
        "int"
    } else {
        "bigint"
    }
}

fn text_type(s: &str) -> &'static str {
    if UUID_RE.is_match(s) {
        "uuid"
    } else if DATE_RE.is_match(s) {
        "date"
    } else if TIME_RE.is_match(s) {
        "time"
    } else if DATETIME_RE.is_match(s) {
        "timestamp"
    } else {
        "string"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::parser::parse_type_string;

    use super::*;

    fn infer_json(value: serde_json::Value) -> String {
        infer_type(&SampleValue::from(&value))
    }

    #[test]
    fn test_scalars() {
        assert_eq!(infer_json(json!(true)), "bool");
        assert_eq!(infer_json(json!(42)), "int");
        assert_eq!(infer_json(json!(3.25)), "float");
        assert_eq!(infer_json(json!("hello")), "string");
        assert_eq!(infer_json(json!(null)), "json?");
    }

    #[test]
    fn test_wide_integers_become_bigint() {
        assert_eq!(infer_json(json!(9_000_000_000_i64)), "bigint");
        assert_eq!(infer_json(json!(-9_000_000_000_i64)), "bigint");
        assert_eq!(infer_json(json!(2_147_483_647)), "int");
    }

    #[test]
    fn test_integer_valued_floats() {
        assert_eq!(infer_json(json!(5.0)), "int");
        assert_eq!(infer_json(json!(9_000_000_000.0)), "bigint");
    }

    #[test]
    fn test_string_sniffing() {
        assert_eq!(
            infer_json(json!("550e8400-e29b-41d4-a716-446655440000")),
            "uuid"
        );
        assert_eq!(infer_json(json!("2024-03-15")), "date");
        assert_eq!(infer_json(json!("14:30:00")), "time");
        assert_eq!(infer_json(json!("2024-03-15T14:30:00Z")), "timestamp");
        assert_eq!(infer_json(json!("2024-03-15 14:30:00")), "timestamp");
        assert_eq!(infer_json(json!("2024-03-15T14:30:00.123+02:00")), "timestamp");
        assert_eq!(infer_json(json!("not-a-uuid-at-all")), "string");
        assert_eq!(infer_json(json!("2024-3-15")), "string");
    }

    #[test]
    fn test_containers() {
        assert_eq!(infer_json(json!({"a": 1})), "json");
        assert_eq!(infer_json(json!([])), "json[]");
        assert_eq!(infer_json(json!([null, null])), "json[]");
        assert_eq!(infer_json(json!([1, 2, 3])), "int[]");
        assert_eq!(infer_json(json!([null, "x"])), "string[]");
        assert_eq!(infer_json(json!(["2024-03-15"])), "date[]");
    }

    #[test]
    fn test_native_variants() {
        assert_eq!(infer_type(&SampleValue::Bytes(vec![1, 2])), "binary");
        assert_eq!(infer_type(&SampleValue::Timestamp(Utc::now())), "timestamp");
    }

    #[test]
    fn test_output_reparses() {
        for value in [
            json!(true),
            json!(7),
            json!(1.5),
            json!("x"),
            json!(null),
            json!([1]),
            json!({"k": "v"}),
            json!("2024-03-15T14:30:00Z"),
        ] {
            let inferred = infer_json(value);
            assert!(
                parse_type_string(&inferred).is_ok(),
                "`{inferred}` failed to reparse"
            );
        }
    }
}
