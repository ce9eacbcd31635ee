//! Parameter type descriptors.
//!
//! A parameter's [`ParamType`] decides which conversion path the binder takes:
//! scalars and nullable scalars convert a single raw value, sequences convert
//! every occurrence (or one JSON array literal), and structured types parse
//! the raw text as JSON.

use std::fmt;

use crate::bind::convert::json_matches;
use crate::bind::value::ArgValue;

/// An enumeration declared by the host: ordered members with integral values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSpec {
    /// Type name shown in diagnostics (e.g. `Weekday`)
    pub name: String,
    /// Members as `(name, value)` pairs in declaration order
    pub members: Vec<(String, i64)>,
}

impl EnumSpec {
    /// Declare an enum whose members take the values `0..n` in order.
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members = members
            .into_iter()
            .enumerate()
            .map(|(index, member)| (member.into(), index as i64))
            .collect();
        Self {
            name: name.into(),
            members,
        }
    }

    /// Declare an enum with explicit member values.
    pub fn with_values<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members
                .into_iter()
                .map(|(member, value)| (member.into(), value))
                .collect(),
        }
    }

    /// Case-insensitive member lookup by name.
    pub fn by_name(&self, text: &str) -> Option<(&str, i64)> {
        self.members
            .iter()
            .find(|(member, _)| member.eq_ignore_ascii_case(text))
            .map(|(member, value)| (member.as_str(), *value))
    }

    /// Member lookup by integral value.
    pub fn by_value(&self, value: i64) -> Option<(&str, i64)> {
        self.members
            .iter()
            .find(|(_, v)| *v == value)
            .map(|(member, v)| (member.as_str(), *v))
    }
}

/// Single-value shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Int,
    UInt,
    Float,
    Char,
    String,
    /// Calendar date, `YYYY-MM-DD`
    Date,
    /// Date and time, ISO-8601 without offset or RFC 3339
    DateTime,
    /// Unique identifier (UUID)
    Guid,
    Enum(EnumSpec),
}

/// The declared type of a method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Scalar(ScalarKind),
    /// Scalar that also accepts the literal `null`
    Nullable(ScalarKind),
    /// Zero or more values; the element must be a scalar or nullable scalar
    Sequence(Box<ParamType>),
    /// JSON object whose values all match the element type
    Map(Box<ParamType>),
    /// Any JSON document
    Json,
}

impl ParamType {
    pub fn bool() -> Self {
        ParamType::Scalar(ScalarKind::Bool)
    }

    pub fn int() -> Self {
        ParamType::Scalar(ScalarKind::Int)
    }

    pub fn uint() -> Self {
        ParamType::Scalar(ScalarKind::UInt)
    }

    pub fn float() -> Self {
        ParamType::Scalar(ScalarKind::Float)
    }

    pub fn string() -> Self {
        ParamType::Scalar(ScalarKind::String)
    }

    pub fn date() -> Self {
        ParamType::Scalar(ScalarKind::Date)
    }

    pub fn guid() -> Self {
        ParamType::Scalar(ScalarKind::Guid)
    }

    pub fn enumeration(spec: EnumSpec) -> Self {
        ParamType::Scalar(ScalarKind::Enum(spec))
    }

    pub fn nullable(kind: ScalarKind) -> Self {
        ParamType::Nullable(kind)
    }

    pub fn sequence(element: ParamType) -> Self {
        ParamType::Sequence(Box::new(element))
    }

    pub fn map(value: ParamType) -> Self {
        ParamType::Map(Box::new(value))
    }

    /// True for types bound from a single JSON text blob.
    pub fn is_structured(&self) -> bool {
        matches!(self, ParamType::Map(_) | ParamType::Json)
    }

    /// True for boolean-valued parameters (plain or nullable).
    pub fn is_bool(&self) -> bool {
        matches!(
            self,
            ParamType::Scalar(ScalarKind::Bool) | ParamType::Nullable(ScalarKind::Bool)
        )
    }

    /// Check that an already-typed value (a declared default) fits this type.
    pub fn accepts(&self, value: &ArgValue) -> bool {
        match (self, value) {
            (ParamType::Nullable(_), ArgValue::Null) => true,
            (ParamType::Scalar(kind) | ParamType::Nullable(kind), value) => kind.accepts(value),
            (ParamType::Sequence(element), ArgValue::List(items)) => {
                items.iter().all(|item| element.accepts(item))
            }
            (ParamType::Map(_) | ParamType::Json, ArgValue::Json(json)) => json_matches(json, self),
            _ => false,
        }
    }
}

impl ScalarKind {
    fn accepts(&self, value: &ArgValue) -> bool {
        match (self, value) {
            (ScalarKind::Bool, ArgValue::Bool(_))
            | (ScalarKind::Int, ArgValue::Int(_))
            | (ScalarKind::UInt, ArgValue::UInt(_))
            | (ScalarKind::Float, ArgValue::Float(_))
            | (ScalarKind::Char, ArgValue::Char(_))
            | (ScalarKind::String, ArgValue::String(_))
            | (ScalarKind::Date, ArgValue::Date(_))
            | (ScalarKind::DateTime, ArgValue::DateTime(_))
            | (ScalarKind::Guid, ArgValue::Guid(_)) => true,
            (ScalarKind::Enum(spec), ArgValue::Enum { name, value }) => spec
                .by_value(*value)
                .is_some_and(|(member, _)| member == name.as_str()),
            _ => false,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::Bool => write!(f, "bool"),
            ScalarKind::Int => write!(f, "int"),
            ScalarKind::UInt => write!(f, "uint"),
            ScalarKind::Float => write!(f, "float"),
            ScalarKind::Char => write!(f, "char"),
            ScalarKind::String => write!(f, "string"),
            ScalarKind::Date => write!(f, "date"),
            ScalarKind::DateTime => write!(f, "datetime"),
            ScalarKind::Guid => write!(f, "guid"),
            ScalarKind::Enum(spec) => write!(f, "{}", spec.name),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Scalar(kind) => write!(f, "{kind}"),
            ParamType::Nullable(kind) => write!(f, "{kind}?"),
            ParamType::Sequence(element) => write!(f, "list<{element}>"),
            ParamType::Map(value) => write!(f, "map<string, {value}>"),
            ParamType::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weekday() -> EnumSpec {
        EnumSpec::new(
            "Weekday",
            [
                "Sunday",
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
            ],
        )
    }

    #[test]
    fn test_enum_lookup_by_name_ignores_case() {
        let spec = weekday();
        assert_eq!(spec.by_name("wednesday"), Some(("Wednesday", 3)));
        assert_eq!(spec.by_name("WEDNESDAY"), Some(("Wednesday", 3)));
        assert_eq!(spec.by_name("Notaday"), None);
    }

    #[test]
    fn test_enum_lookup_by_value() {
        let spec = EnumSpec::with_values("Level", [("Low", 10), ("High", 20)]);
        assert_eq!(spec.by_value(20), Some(("High", 20)));
        assert_eq!(spec.by_value(15), None);
    }

    #[test]
    fn test_display_nested_types() {
        assert_eq!(ParamType::sequence(ParamType::int()).to_string(), "list<int>");
        assert_eq!(
            ParamType::map(ParamType::nullable(ScalarKind::Guid)).to_string(),
            "map<string, guid?>"
        );
        assert_eq!(ParamType::enumeration(weekday()).to_string(), "Weekday");
    }

    #[test]
    fn test_accepts_matching_values() {
        assert!(ParamType::int().accepts(&ArgValue::Int(1)));
        assert!(!ParamType::int().accepts(&ArgValue::from("one")));
        assert!(!ParamType::uint().accepts(&ArgValue::Int(1)));
        assert!(ParamType::nullable(ScalarKind::Guid).accepts(&ArgValue::Null));
        assert!(!ParamType::string().accepts(&ArgValue::Null));
        assert!(
            ParamType::sequence(ParamType::int())
                .accepts(&ArgValue::List(vec![ArgValue::Int(1), ArgValue::Int(2)]))
        );
        assert!(
            !ParamType::sequence(ParamType::int())
                .accepts(&ArgValue::List(vec![ArgValue::from("x")]))
        );
        assert!(
            ParamType::map(ParamType::int()).accepts(&ArgValue::Json(serde_json::json!({"a": 1})))
        );
        assert!(!ParamType::map(ParamType::int()).accepts(&ArgValue::Json(serde_json::json!([1]))));
    }

    #[test]
    fn test_accepts_enum_member_only() {
        let day = ParamType::enumeration(weekday());
        assert!(day.accepts(&ArgValue::Enum {
            name: "Monday".to_string(),
            value: 1,
        }));
        assert!(!day.accepts(&ArgValue::Enum {
            name: "Monday".to_string(),
            value: 2,
        }));
        assert!(!day.accepts(&ArgValue::Int(1)));
    }
}
