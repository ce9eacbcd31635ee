//! Typed argument values produced by the binder.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use uuid::Uuid;

/// A converted parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    String(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Guid(Uuid),
    /// Enum member; serialized by name
    Enum { name: String, value: i64 },
    List(Vec<ArgValue>),
    Json(serde_json::Value),
}

impl ArgValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ArgValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ArgValue::Int(n) => Some(*n),
            ArgValue::UInt(n) => i64::try_from(*n).ok(),
            ArgValue::Enum { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgValue::Float(n) => Some(*n),
            ArgValue::Int(n) => Some(*n as f64),
            ArgValue::UInt(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::String(s) => Some(s),
            ArgValue::Enum { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ArgValue]> {
        match self {
            ArgValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ArgValue::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl Serialize for ArgValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ArgValue::Null => serializer.serialize_unit(),
            ArgValue::Bool(b) => serializer.serialize_bool(*b),
            ArgValue::Int(n) => serializer.serialize_i64(*n),
            ArgValue::UInt(n) => serializer.serialize_u64(*n),
            ArgValue::Float(n) => serializer.serialize_f64(*n),
            ArgValue::Char(c) => serializer.serialize_char(*c),
            ArgValue::String(s) => serializer.serialize_str(s),
            ArgValue::Date(d) => d.serialize(serializer),
            ArgValue::DateTime(dt) => dt.serialize(serializer),
            ArgValue::Guid(id) => id.serialize(serializer),
            ArgValue::Enum { name, .. } => serializer.serialize_str(name),
            ArgValue::List(items) => items.serialize(serializer),
            ArgValue::Json(value) => value.serialize(serializer),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::Float(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::String(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::String(value)
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Null => write!(f, "null"),
            ArgValue::Bool(b) => write!(f, "{b}"),
            ArgValue::Int(n) => write!(f, "{n}"),
            ArgValue::UInt(n) => write!(f, "{n}"),
            ArgValue::Float(n) => write!(f, "{n}"),
            ArgValue::Char(c) => write!(f, "{c}"),
            ArgValue::String(s) => write!(f, "{s}"),
            ArgValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            ArgValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            ArgValue::Guid(id) => write!(f, "{id}"),
            ArgValue::Enum { name, .. } => write!(f, "{name}"),
            ArgValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            ArgValue::Json(value) => write!(f, "{value}"),
        }
    }
}

/// Arguments bound to a method, aligned with its declared parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArgs {
    entries: Vec<(String, ArgValue)>,
}

impl BoundArgs {
    pub(crate) fn push(&mut self, name: impl Into<String>, value: ArgValue) {
        self.entries.push((name.into(), value));
    }

    /// Value of the named parameter.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.entries
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
    }

    /// Value at the given declaration position.
    pub fn at(&self, index: usize) -> Option<&ArgValue> {
        self.entries.get(index).map(|(_, value)| value)
    }

    /// Values in declaration order.
    pub fn values(&self) -> impl Iterator<Item = &ArgValue> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn string(&self, name: &str) -> anyhow::Result<&str> {
        self.get(name)
            .and_then(ArgValue::as_str)
            .ok_or_else(|| anyhow::anyhow!("argument '{name}' is not a string"))
    }

    pub fn int(&self, name: &str) -> anyhow::Result<i64> {
        self.get(name)
            .and_then(ArgValue::as_i64)
            .ok_or_else(|| anyhow::anyhow!("argument '{name}' is not an integer"))
    }

    pub fn float(&self, name: &str) -> anyhow::Result<f64> {
        self.get(name)
            .and_then(ArgValue::as_f64)
            .ok_or_else(|| anyhow::anyhow!("argument '{name}' is not a number"))
    }

    pub fn flag(&self, name: &str) -> anyhow::Result<bool> {
        self.get(name)
            .and_then(ArgValue::as_bool)
            .ok_or_else(|| anyhow::anyhow!("argument '{name}' is not a bool"))
    }

    pub fn list(&self, name: &str) -> anyhow::Result<&[ArgValue]> {
        self.get(name)
            .and_then(ArgValue::as_list)
            .ok_or_else(|| anyhow::anyhow!("argument '{name}' is not a list"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_serializes_by_member_name() {
        let value = ArgValue::Enum {
            name: "Wednesday".to_string(),
            value: 3,
        };
        let json = serde_json::to_value(&value).expect("serialize");
        assert_eq!(json, serde_json::json!("Wednesday"));
    }

    #[test]
    fn test_list_display() {
        let value = ArgValue::List(vec![ArgValue::Int(3), ArgValue::Int(4)]);
        assert_eq!(value.to_string(), "[3, 4]");
    }

    #[test]
    fn test_bound_args_accessors() {
        let mut args = BoundArgs::default();
        args.push("name", ArgValue::from("ada"));
        args.push("times", ArgValue::Int(2));

        assert_eq!(args.string("name").expect("name"), "ada");
        assert_eq!(args.int("times").expect("times"), 2);
        assert!(args.flag("times").is_err());
        assert_eq!(args.at(1), Some(&ArgValue::Int(2)));
        assert_eq!(args.len(), 2);
    }
}
