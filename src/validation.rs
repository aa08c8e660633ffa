//! Request-body field validation.
//!
//! Every rule records its failure into a shared [`FieldErrors`] map instead of
//! returning early, so a single response lists every bad field at once.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const NOT_AN_INTEGER: &str = "A valid integer is required.";
pub const BAD_DATETIME: &str =
    "Datetime has wrong format. Use one of these formats instead: YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z].";

/// Per-field error messages, serialized as `{"field": ["message", ...]}`.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
}

#[derive(Debug, Clone, Copy)]
pub struct TextRule {
    pub max_len: Option<usize>,
    pub allow_blank: bool,
    pub trim: bool,
}

impl TextRule {
    pub const fn bounded(max_len: usize) -> Self {
        Self {
            max_len: Some(max_len),
            allow_blank: false,
            trim: true,
        }
    }

    pub const fn unbounded() -> Self {
        Self {
            max_len: None,
            allow_blank: false,
            trim: true,
        }
    }

    pub const fn blank_ok() -> Self {
        Self {
            max_len: None,
            allow_blank: true,
            trim: true,
        }
    }

    /// Secrets keep surrounding whitespace.
    pub const fn secret() -> Self {
        Self {
            max_len: None,
            allow_blank: false,
            trim: false,
        }
    }
}

pub fn object(body: &Value) -> Result<&Map<String, Value>, FieldErrors> {
    let kind = match body {
        Value::Object(map) => return Ok(map),
        Value::Array(_) => "list",
        Value::String(_) => "str",
        Value::Number(_) => "number",
        Value::Bool(_) => "bool",
        Value::Null => "null",
    };
    Err(FieldErrors::single(
        "non_field_errors",
        format!("Invalid data. Expected a dictionary, but got {kind}."),
    ))
}

/// Looks up `field`, reporting absence and explicit nulls.
fn present<'a>(
    obj: &'a Map<String, Value>,
    field: &str,
    presence: Presence,
    errors: &mut FieldErrors,
) -> Option<&'a Value> {
    match obj.get(field) {
        None => {
            if presence == Presence::Required {
                errors.add(field, REQUIRED);
            }
            None
        }
        Some(Value::Null) => {
            errors.add(field, NOT_NULL);
            None
        }
        Some(value) => Some(value),
    }
}

pub fn text(
    obj: &Map<String, Value>,
    field: &str,
    presence: Presence,
    rule: TextRule,
    errors: &mut FieldErrors,
) -> Option<String> {
    let raw = match present(obj, field, presence, errors)? {
        Value::String(s) if rule.trim => s.trim().to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => {
            errors.add(field, NOT_A_STRING);
            return None;
        }
    };

    if raw.trim().is_empty() && !rule.allow_blank {
        errors.add(field, NOT_BLANK);
        return None;
    }
    if let Some(max) = rule.max_len {
        if raw.chars().count() > max {
            errors.add(
                field,
                format!("Ensure this field has no more than {max} characters."),
            );
            return None;
        }
    }
    Some(raw)
}

pub fn datetime(
    obj: &Map<String, Value>,
    field: &str,
    presence: Presence,
    errors: &mut FieldErrors,
) -> Option<DateTime<Utc>> {
    let parsed = match present(obj, field, presence, errors)? {
        Value::String(s) => parse_datetime(s.trim()),
        _ => None,
    };
    if parsed.is_none() {
        errors.add(field, BAD_DATETIME);
    }
    parsed
}

pub fn positive_int(
    obj: &Map<String, Value>,
    field: &str,
    presence: Presence,
    errors: &mut FieldErrors,
) -> Option<i64> {
    let parsed = match present(obj, field, presence, errors)? {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    match parsed {
        None => {
            errors.add(field, NOT_AN_INTEGER);
            None
        }
        Some(n) if n < 1 => {
            errors.add(field, "Ensure this value is greater than or equal to 1.");
            None
        }
        Some(n) => Some(n),
    }
}

/// Accepts RFC 3339 (converted to UTC) or a naive date-time taken as UTC.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_object_rejects_non_dictionaries() {
        let err = object(&json!([1, 2])).unwrap_err();
        assert_eq!(
            err.get("non_field_errors").unwrap()[0],
            "Invalid data. Expected a dictionary, but got list."
        );
        assert!(object(&json!({})).is_ok());
    }

    #[test]
    fn test_text_required_and_blank() {
        let body = obj(json!({"b": "   ", "c": null}));
        let mut errors = FieldErrors::new();
        assert!(text(&body, "a", Presence::Required, TextRule::unbounded(), &mut errors).is_none());
        assert!(text(&body, "b", Presence::Required, TextRule::unbounded(), &mut errors).is_none());
        assert!(text(&body, "c", Presence::Optional, TextRule::unbounded(), &mut errors).is_none());
        assert_eq!(errors.get("a").unwrap(), [REQUIRED]);
        assert_eq!(errors.get("b").unwrap(), [NOT_BLANK]);
        assert_eq!(errors.get("c").unwrap(), [NOT_NULL]);
    }

    #[test]
    fn test_text_optional_absent_is_not_an_error() {
        let body = obj(json!({}));
        let mut errors = FieldErrors::new();
        assert!(text(&body, "a", Presence::Optional, TextRule::blank_ok(), &mut errors).is_none());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_text_trims_and_limits_length() {
        let body = obj(json!({"name": "  Alice  ", "phone": "0123456789012345678901", "n": 42}));
        let mut errors = FieldErrors::new();
        assert_eq!(
            text(&body, "name", Presence::Required, TextRule::bounded(255), &mut errors).as_deref(),
            Some("Alice")
        );
        assert!(text(&body, "phone", Presence::Required, TextRule::bounded(20), &mut errors).is_none());
        assert_eq!(
            text(&body, "n", Presence::Required, TextRule::unbounded(), &mut errors).as_deref(),
            Some("42")
        );
        assert_eq!(
            errors.get("phone").unwrap(),
            ["Ensure this field has no more than 20 characters."]
        );
    }

    #[test]
    fn test_text_rejects_non_scalar() {
        let body = obj(json!({"name": ["x"]}));
        let mut errors = FieldErrors::new();
        assert!(text(&body, "name", Presence::Required, TextRule::unbounded(), &mut errors).is_none());
        assert_eq!(errors.get("name").unwrap(), [NOT_A_STRING]);
    }

    #[test]
    fn test_positive_int() {
        let body = obj(json!({"a": 150, "b": "30", "c": 0, "d": "ten", "e": 2.5, "f": 45.0}));
        let mut errors = FieldErrors::new();
        assert_eq!(positive_int(&body, "a", Presence::Required, &mut errors), Some(150));
        assert_eq!(positive_int(&body, "b", Presence::Required, &mut errors), Some(30));
        assert_eq!(positive_int(&body, "c", Presence::Required, &mut errors), None);
        assert_eq!(positive_int(&body, "d", Presence::Required, &mut errors), None);
        assert_eq!(positive_int(&body, "e", Presence::Required, &mut errors), None);
        assert_eq!(positive_int(&body, "f", Presence::Required, &mut errors), Some(45));
        assert_eq!(
            errors.get("c").unwrap(),
            ["Ensure this value is greater than or equal to 1."]
        );
        assert_eq!(errors.get("d").unwrap(), [NOT_AN_INTEGER]);
        assert_eq!(errors.get("e").unwrap(), [NOT_AN_INTEGER]);
    }

    #[test]
    fn test_parse_datetime_formats() {
        let utc = parse_datetime("2025-06-01T10:00:00Z").unwrap();
        assert_eq!(utc.to_rfc3339(), "2025-06-01T10:00:00+00:00");

        let offset = parse_datetime("2025-06-01T12:00:00+02:00").unwrap();
        assert_eq!(offset, utc);

        assert_eq!(parse_datetime("2025-06-01T10:00").unwrap(), utc);
        assert_eq!(parse_datetime("2025-06-01 10:00:00").unwrap(), utc);
        assert!(parse_datetime("June 1st").is_none());
        assert!(parse_datetime("2025-13-01T10:00:00Z").is_none());
    }

    #[test]
    fn test_datetime_rejects_non_strings() {
        let body = obj(json!({"when": 1700000000}));
        let mut errors = FieldErrors::new();
        assert!(datetime(&body, "when", Presence::Required, &mut errors).is_none());
        assert_eq!(errors.get("when").unwrap(), [BAD_DATETIME]);
    }
}
