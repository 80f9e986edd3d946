//! Option value types and the runtime values they coerce into.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value type of an option or positional argument.
///
/// The switch scanner uses this to decide whether a switch consumes a value
/// token and how the raw string is converted.
///
/// # Examples
///
/// ```
/// use command_tree_core::{Value, ValueType};
///
/// assert_eq!(ValueType::Integer.coerce("42"), Ok(Value::Integer(42)));
/// assert!(ValueType::Integer.coerce("forty-two").is_err());
/// assert!(!ValueType::Boolean.takes_value());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Verbatim string (the default).
    #[default]
    String,
    /// Signed 64-bit integer.
    Integer,
    /// 64-bit float.
    Float,
    /// Presence switch; `--no-name` negates.
    Boolean,
    /// Incremented once per occurrence.
    Count,
    /// String collected into a list, one element per occurrence.
    Repeated,
}

impl ValueType {
    /// Whether a switch of this type consumes the following token as its value.
    pub fn takes_value(self) -> bool {
        !matches!(self, ValueType::Boolean | ValueType::Count)
    }

    /// Whether occurrences of this type always accumulate into a list.
    pub fn always_accumulates(self) -> bool {
        matches!(self, ValueType::Repeated)
    }

    /// Converts a raw command-line string into a typed value.
    ///
    /// Returns a short reason on failure; callers attach the option name.
    pub fn coerce(self, raw: &str) -> Result<Value, String> {
        match self {
            ValueType::String | ValueType::Repeated => Ok(Value::String(raw.to_string())),
            ValueType::Integer | ValueType::Count => raw
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| format!("expected an integer, got '{raw}'")),
            ValueType::Float => raw
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| format!("expected a number, got '{raw}'")),
            ValueType::Boolean => match raw.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Value::Boolean(true)),
                "false" | "no" | "0" => Ok(Value::Boolean(false)),
                _ => Err(format!("expected true or false, got '{raw}'")),
            },
        }
    }

    /// Checks that `value` is a legal (already converted) value for this type.
    ///
    /// Used to validate declared defaults at build time. Lists are accepted
    /// for every type so accumulating options can default to a sequence.
    pub fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::List(items)) => items.iter().all(|item| self.accepts(item)),
            (ValueType::String | ValueType::Repeated, Value::String(_)) => true,
            (ValueType::Integer | ValueType::Count, Value::Integer(_)) => true,
            (ValueType::Float, Value::Float(_) | Value::Integer(_)) => true,
            (ValueType::Boolean, Value::Boolean(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::Boolean => "boolean",
            ValueType::Count => "count",
            ValueType::Repeated => "repeated",
        };
        f.write_str(name)
    }
}

/// A resolved option value.
///
/// Serialized untagged, so a resolved option set renders as plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_coercion_accepts_common_spellings() {
        assert_eq!(ValueType::Boolean.coerce("YES"), Ok(Value::Boolean(true)));
        assert_eq!(ValueType::Boolean.coerce("0"), Ok(Value::Boolean(false)));
        assert!(ValueType::Boolean.coerce("maybe").is_err());
    }

    #[test]
    fn test_float_coercion_and_error_message() {
        assert_eq!(ValueType::Float.coerce("2.5"), Ok(Value::Float(2.5)));
        let err = ValueType::Float.coerce("abc").unwrap_err();
        assert!(err.contains("'abc'"));
    }

    #[test]
    fn test_accepts_checks_defaults() {
        assert!(ValueType::String.accepts(&Value::from("Hello")));
        assert!(!ValueType::Integer.accepts(&Value::from("Hello")));
        assert!(ValueType::Float.accepts(&Value::Integer(3)));
        assert!(ValueType::Repeated.accepts(&Value::List(vec!["a".into(), "b".into()])));
        assert!(!ValueType::Boolean.accepts(&Value::List(vec![Value::Integer(1)])));
    }

    #[test]
    fn test_value_serializes_untagged() {
        let value = Value::List(vec![Value::from("a"), Value::Integer(2), Value::Boolean(true)]);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"["a",2,true]"#);
    }
}
