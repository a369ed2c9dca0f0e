//! Value classification.
//!
//! [`classify`] maps one stored value to its [`TypeTag`]. It is pure, never
//! fails, and falls back to [`TypeTag::String`] for anything it does not
//! recognise.

use bson::{Bson, spec::BinarySubtype};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::tag::TypeTag;

static DATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})$").expect("date pattern compiles")
});

static DATETIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(\d{4}-\d{2}-\d{2})",
        r"[T ]([01]\d|2[0-3]):[0-5]\d(:[0-5]\d(\.\d+)?)?",
        r"(Z|[+-]\d{2}:?\d{2})?$",
    ))
    .expect("datetime pattern compiles")
});

fn is_calendar_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Classifies a BSON value.
///
/// Booleans are matched ahead of the numeric variants and never report
/// `integer`. Doubles are `float` even when integral, since the store keeps
/// them as a distinct type.
pub fn classify(value: &Bson) -> TypeTag {
    match value {
        Bson::Null | Bson::Undefined => TypeTag::Null,
        Bson::Boolean(_) => TypeTag::Boolean,
        Bson::Int32(_) | Bson::Int64(_) => TypeTag::Integer,
        Bson::Double(_) => TypeTag::Float,
        Bson::Decimal128(_) => TypeTag::Decimal,
        Bson::String(s) => classify_str(s),
        Bson::DateTime(_) => TypeTag::Datetime,
        Bson::Timestamp(_) => TypeTag::Timestamp,
        Bson::Array(_) => TypeTag::List,
        Bson::Document(_) => TypeTag::Object,
        Bson::ObjectId(_) => TypeTag::Identifier,
        Bson::Binary(binary) if binary.subtype == BinarySubtype::Uuid => TypeTag::Identifier,
        _ => TypeTag::String,
    }
}

/// Classifies a string by its content: `date`, `datetime` or `string`.
pub fn classify_str(value: &str) -> TypeTag {
    if let Some(caps) = DATE_REGEX.captures(value) {
        if is_calendar_date(&caps[1]) {
            return TypeTag::Date;
        }
    }

    if let Some(caps) = DATETIME_REGEX.captures(value) {
        if is_calendar_date(&caps[1]) {
            return TypeTag::Datetime;
        }
    }

    TypeTag::String
}

/// Classifies a plain JSON value, used for declared literals and examples.
pub fn classify_json(value: &Value) -> TypeTag {
    match value {
        Value::Null => TypeTag::Null,
        Value::Bool(_) => TypeTag::Boolean,
        Value::Number(n) if n.is_i64() || n.is_u64() => TypeTag::Integer,
        Value::Number(_) => TypeTag::Float,
        Value::String(s) => classify_str(s),
        Value::Array(_) => TypeTag::List,
        Value::Object(_) => TypeTag::Object,
    }
}
