//! Value types and conversion of raw tokens into typed values.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A raw token that could not be converted to the requested kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{raw}' is not a valid {kind}")]
pub struct CastError {
    pub kind: ValueKind,
    pub raw: String,
}

/// The scalar kinds a parameter can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Any string (default, no conversion)
    #[default]
    String,
    /// Signed 64-bit integer
    Integer,
    /// 64-bit floating point
    Double,
    /// `true` or `false`, case-insensitive
    Boolean,
    /// The first character of the token
    Character,
    /// A filesystem path, checked by the parser's existence predicate
    Path,
}

impl ValueKind {
    /// One-letter tag used in help output.
    pub fn tag(self) -> char {
        match self {
            ValueKind::String => 'S',
            ValueKind::Integer => 'I',
            ValueKind::Double => 'D',
            ValueKind::Boolean => 'B',
            ValueKind::Character => 'C',
            ValueKind::Path => 'P',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Double => "double",
            ValueKind::Boolean => "boolean",
            ValueKind::Character => "character",
            ValueKind::Path => "path",
        }
    }

    pub const ALL: [ValueKind; 6] = [
        ValueKind::String,
        ValueKind::Integer,
        ValueKind::Double,
        ValueKind::Boolean,
        ValueKind::Character,
        ValueKind::Path,
    ];
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The declared type of a parameter: a kind, held once or as an array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueType {
    pub kind: ValueKind,
    pub array: bool,
}

impl ValueType {
    pub fn scalar(kind: ValueKind) -> Self {
        Self { kind, array: false }
    }

    pub fn array(kind: ValueKind) -> Self {
        Self { kind, array: true }
    }

    /// Bracketed tag for help output, e.g. `[I]` or `[S..]`.
    pub fn tag(&self) -> String {
        if self.array {
            format!("[{}..]", self.kind.tag())
        } else {
            format!("[{}]", self.kind.tag())
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.array {
            write!(f, "{} array", self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}

/// A single converted value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    Character(char),
    Path(PathBuf),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Integer(_) => ValueKind::Integer,
            Value::Double(_) => ValueKind::Double,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Character(_) => ValueKind::Character,
            Value::Path(_) => ValueKind::Path,
        }
    }
}

/// The memoized result of converting all of a parameter's raw tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Scalar(Value),
    Array(Vec<Value>),
}

impl TypedValue {
    /// All values in input order. A scalar yields a one-element slice.
    pub fn values(&self) -> &[Value] {
        match self {
            TypedValue::Scalar(v) => std::slice::from_ref(v),
            TypedValue::Array(vs) => vs,
        }
    }
}

/// Convert one raw token into a value of the given kind.
pub fn cast_scalar(raw: &str, kind: ValueKind) -> Result<Value, CastError> {
    let fail = || CastError {
        kind,
        raw: raw.to_string(),
    };

    match kind {
        ValueKind::String => Ok(Value::String(raw.to_string())),
        ValueKind::Integer => raw.parse().map(Value::Integer).map_err(|_| fail()),
        ValueKind::Double => raw.parse().map(Value::Double).map_err(|_| fail()),
        ValueKind::Boolean => {
            if raw.eq_ignore_ascii_case("true") {
                Ok(Value::Boolean(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Ok(Value::Boolean(false))
            } else {
                Err(fail())
            }
        }
        ValueKind::Character => raw.chars().next().map(Value::Character).ok_or_else(fail),
        ValueKind::Path => Ok(Value::Path(PathBuf::from(raw))),
    }
}

/// Convert a parameter's raw tokens according to its declared type.
///
/// Array elements are converted independently; the first failing element is
/// reported.
pub fn cast(raw: &[String], value_type: ValueType) -> Result<TypedValue, CastError> {
    if value_type.array {
        raw.iter()
            .map(|r| cast_scalar(r, value_type.kind))
            .collect::<Result<Vec<_>, _>>()
            .map(TypedValue::Array)
    } else {
        let first = raw.first().map(String::as_str).unwrap_or_default();
        cast_scalar(first, value_type.kind).map(TypedValue::Scalar)
    }
}

/// Rust types that typed accessors can return.
pub trait FromValue: Sized {
    const KIND: ValueKind;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    const KIND: ValueKind = ValueKind::Integer;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    const KIND: ValueKind = ValueKind::Double;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }
}

impl FromValue for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for char {
    const KIND: ValueKind = ValueKind::Character;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Character(c) => Some(*c),
            _ => None,
        }
    }
}

impl FromValue for PathBuf {
    const KIND: ValueKind = ValueKind::Path;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Path(p) => Some(p.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cast_string_is_identity() {
        assert_eq!(
            cast_scalar("hello world", ValueKind::String),
            Ok(Value::String("hello world".to_string()))
        );
    }

    #[test]
    fn test_cast_integer() {
        assert_eq!(cast_scalar("-42", ValueKind::Integer), Ok(Value::Integer(-42)));
        let err = cast_scalar("4x2", ValueKind::Integer).unwrap_err();
        assert_eq!(err.raw, "4x2");
        assert_eq!(err.kind, ValueKind::Integer);
    }

    #[test]
    fn test_cast_double_rejects_two_dots() {
        assert_eq!(cast_scalar("5.5", ValueKind::Double), Ok(Value::Double(5.5)));
        let err = cast_scalar("5.5.5", ValueKind::Double).unwrap_err();
        assert_eq!(err.raw, "5.5.5");
    }

    #[test]
    fn test_cast_boolean_is_case_insensitive() {
        assert_eq!(cast_scalar("TRUE", ValueKind::Boolean), Ok(Value::Boolean(true)));
        assert_eq!(cast_scalar("False", ValueKind::Boolean), Ok(Value::Boolean(false)));
        assert!(cast_scalar("yes", ValueKind::Boolean).is_err());
    }

    #[test]
    fn test_cast_character_takes_first_code_point() {
        assert_eq!(cast_scalar("éa", ValueKind::Character), Ok(Value::Character('é')));
        assert!(cast_scalar("", ValueKind::Character).is_err());
    }

    #[test]
    fn test_cast_array_reports_first_bad_element() {
        let ok = cast(&tokens(&["1", "2", "3"]), ValueType::array(ValueKind::Integer)).unwrap();
        assert_eq!(
            ok,
            TypedValue::Array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)])
        );

        let err = cast(
            &tokens(&["1", "two", "three"]),
            ValueType::array(ValueKind::Integer),
        )
        .unwrap_err();
        assert_eq!(err.raw, "two");
    }

    #[test]
    fn test_value_type_tag() {
        assert_eq!(ValueType::scalar(ValueKind::Double).tag(), "[D]");
        assert_eq!(ValueType::array(ValueKind::String).tag(), "[S..]");
    }

    #[test]
    fn test_from_value_rejects_other_kinds() {
        assert_eq!(i64::from_value(&Value::Integer(3)), Some(3));
        assert_eq!(i64::from_value(&Value::Double(3.0)), None);
        assert_eq!(
            PathBuf::from_value(&Value::Path(PathBuf::from("/tmp"))),
            Some(PathBuf::from("/tmp"))
        );
    }
}
