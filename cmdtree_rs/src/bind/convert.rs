//! Raw text to [`ArgValue`] conversion, one function per type shape.
//!
//! Parsing is culture-invariant: `.` is the decimal separator, dates are
//! ISO-8601, booleans are `true`/`false` in any case.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use uuid::Uuid;

use super::value::ArgValue;
use crate::error::BindingErrorKind;
use crate::tree::{ParamType, ScalarKind};

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn cannot_convert(raw: &str, target: impl ToString) -> BindingErrorKind {
    BindingErrorKind::CannotConvert {
        value: raw.to_string(),
        target: target.to_string(),
    }
}

/// Convert one raw value to a scalar.
///
/// An empty value on a boolean means the flag was present: `true`.
pub fn convert_scalar(kind: &ScalarKind, raw: &str) -> Result<ArgValue, BindingErrorKind> {
    match kind {
        ScalarKind::Bool => {
            if raw.is_empty() || raw.eq_ignore_ascii_case("true") {
                Ok(ArgValue::Bool(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Ok(ArgValue::Bool(false))
            } else {
                Err(cannot_convert(raw, kind))
            }
        }
        ScalarKind::Int => raw
            .parse()
            .map(ArgValue::Int)
            .map_err(|_| cannot_convert(raw, kind)),
        ScalarKind::UInt => raw
            .parse()
            .map(ArgValue::UInt)
            .map_err(|_| cannot_convert(raw, kind)),
        ScalarKind::Float => raw
            .parse()
            .map(ArgValue::Float)
            .map_err(|_| cannot_convert(raw, kind)),
        ScalarKind::Char => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(ArgValue::Char(c)),
                _ => Err(cannot_convert(raw, kind)),
            }
        }
        ScalarKind::String => Ok(ArgValue::String(raw.to_string())),
        ScalarKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(ArgValue::Date)
            .map_err(|_| cannot_convert(raw, kind)),
        ScalarKind::DateTime => parse_datetime(raw)
            .map(ArgValue::DateTime)
            .ok_or_else(|| cannot_convert(raw, kind)),
        ScalarKind::Guid => Uuid::parse_str(raw)
            .map(ArgValue::Guid)
            .map_err(|_| BindingErrorKind::CannotParseGuid(raw.to_string())),
        ScalarKind::Enum(spec) => {
            let member = spec
                .by_name(raw)
                .or_else(|| raw.parse::<i64>().ok().and_then(|value| spec.by_value(value)));
            match member {
                Some((name, value)) => Ok(ArgValue::Enum {
                    name: name.to_string(),
                    value,
                }),
                None => Err(BindingErrorKind::NotInEnum {
                    value: raw.to_string(),
                    target: spec.name.clone(),
                }),
            }
        }
    }
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

/// Convert one raw value to a nullable scalar; `null` in any case is [`ArgValue::Null`].
pub fn convert_nullable(kind: &ScalarKind, raw: &str) -> Result<ArgValue, BindingErrorKind> {
    if raw.eq_ignore_ascii_case("null") {
        return Ok(ArgValue::Null);
    }
    convert_scalar(kind, raw)
}

/// Convert a single value of a sequence's element type.
fn convert_element(element: &ParamType, raw: &str) -> Result<ArgValue, BindingErrorKind> {
    match element {
        ParamType::Scalar(kind) => convert_scalar(kind, raw),
        ParamType::Nullable(kind) => convert_nullable(kind, raw),
        other => Err(BindingErrorKind::Unsupported(format!("list<{other}>"))),
    }
}

fn opens_json_array(raw: &str) -> bool {
    raw.trim_start().starts_with('[')
}

fn is_json_array(raw: &str) -> bool {
    let raw = raw.trim();
    raw.starts_with('[') && raw.ends_with(']')
}

fn is_text(element: &ParamType) -> bool {
    matches!(
        element,
        ParamType::Scalar(ScalarKind::String) | ParamType::Nullable(ScalarKind::String)
    )
}

/// Convert every value of a sequence parameter, preserving order.
///
/// A JSON array literal, whole or split across several value words, is taken
/// as the whole sequence. Mixing a complete array literal with further values
/// is rejected. Text elements that merely look like an array (`[draft]`) fall
/// back to literal values.
pub fn convert_sequence(element: &ParamType, raws: &[String]) -> Result<ArgValue, BindingErrorKind> {
    if !matches!(element, ParamType::Scalar(_) | ParamType::Nullable(_)) {
        return Err(BindingErrorKind::Unsupported(format!("list<{element}>")));
    }

    if raws.len() > 1
        && !is_text(element)
        && let Some(array) = raws.iter().find(|raw| is_json_array(raw))
    {
        return Err(cannot_convert(array, format!("list<{element}>")));
    }

    let joined = raws.join(" ");
    if opens_json_array(&joined) {
        match serde_json::from_str::<Vec<Value>>(&joined) {
            Ok(items) => {
                return items
                    .iter()
                    .map(|item| convert_element(element, &json_item_text(item)))
                    .collect::<Result<Vec<_>, _>>()
                    .map(ArgValue::List);
            }
            Err(_) if is_text(element) => {}
            Err(e) => return Err(BindingErrorKind::CannotDeserialize(e.to_string())),
        }
    }

    raws.iter()
        .map(|raw| convert_element(element, raw))
        .collect::<Result<Vec<_>, _>>()
        .map(ArgValue::List)
}

fn json_item_text(item: &Value) -> String {
    match item {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Parse the raw values, rejoined with single spaces, as JSON and check the
/// result against the shape. `{ "a": 1 }` split by the shell into four words
/// reads back as one document.
pub fn convert_structured(
    param_type: &ParamType,
    raws: &[String],
) -> Result<ArgValue, BindingErrorKind> {
    let text = raws.join(" ");
    let value: Value = serde_json::from_str(&text)
        .map_err(|e| BindingErrorKind::CannotDeserialize(e.to_string()))?;

    if !json_matches(&value, param_type) {
        return Err(BindingErrorKind::CannotDeserialize(format!(
            "expected {param_type}"
        )));
    }
    Ok(ArgValue::Json(value))
}

pub(crate) fn json_matches(value: &Value, param_type: &ParamType) -> bool {
    match param_type {
        ParamType::Json => true,
        ParamType::Scalar(kind) => json_matches_scalar(value, kind),
        ParamType::Nullable(kind) => value.is_null() || json_matches_scalar(value, kind),
        ParamType::Sequence(element) => value
            .as_array()
            .is_some_and(|items| items.iter().all(|item| json_matches(item, element))),
        ParamType::Map(element) => value
            .as_object()
            .is_some_and(|entries| entries.values().all(|entry| json_matches(entry, element))),
    }
}

fn json_matches_scalar(value: &Value, kind: &ScalarKind) -> bool {
    match (kind, value) {
        (ScalarKind::Bool, Value::Bool(_)) => true,
        (ScalarKind::Int, Value::Number(n)) => n.is_i64(),
        (ScalarKind::UInt, Value::Number(n)) => n.is_u64(),
        (ScalarKind::Float, Value::Number(_)) => true,
        (ScalarKind::Enum(spec), Value::Number(n)) => {
            n.as_i64().is_some_and(|v| spec.by_value(v).is_some())
        }
        (_, Value::String(text)) => {
            !matches!(kind, ScalarKind::Bool | ScalarKind::Int | ScalarKind::UInt | ScalarKind::Float)
                && convert_scalar(kind, text).is_ok()
        }
        _ => false,
    }
}
