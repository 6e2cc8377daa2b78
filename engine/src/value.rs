//! Scalar values and their text cell representation.
//!
//! Decoding is heuristic when no type hint is available. Unquoting happens
//! before classification, so a quoted `"true"` still decodes as a boolean.

use crate::schema::FieldType;
use std::borrow::Cow;

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value (JSON `null`); encodes as an empty cell
    Null,
    String(String),
    Number(serde_json::Number),
    Boolean(bool),
    /// Nested object or array, carried as one unit
    Structured(serde_json::Value),
}

impl Value {
    /// Convert a JSON value.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            other => Value::Structured(other),
        }
    }

    /// Convert into a JSON value.
    pub fn into_json(self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::String(s) => serde_json::Value::String(s),
            Value::Number(n) => serde_json::Value::Number(n),
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::Structured(v) => v,
        }
    }

    /// The column type this value would carry in a typed header.
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            Value::Null => None,
            Value::String(_) => Some(FieldType::String),
            Value::Number(_) => Some(FieldType::Number),
            Value::Boolean(_) => Some(FieldType::Boolean),
            Value::Structured(_) => Some(FieldType::Json),
        }
    }

    /// Encode as cell text, quoting when needed.
    pub fn encode_cell(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::String(s) => quote_cell(s).into_owned(),
            Value::Number(n) => n.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Structured(v) => quote_cell(&v.to_string()).into_owned(),
        }
    }

    /// Decode unquoted cell text without a type hint.
    ///
    /// Priority: structured JSON, boolean, decimal number, string.
    pub fn decode_cell(text: &str) -> Self {
        if text.starts_with('{') || text.starts_with('[') {
            if let Ok(v) = serde_json::from_str::<serde_json::Value>(text) {
                return Value::Structured(v);
            }
        }

        match text {
            "true" => return Value::Boolean(true),
            "false" => return Value::Boolean(false),
            _ => {}
        }

        if let Some(n) = parse_number(text) {
            return Value::Number(n);
        }

        Value::String(text.to_string())
    }

    /// Decode unquoted cell text against a column type hint.
    ///
    /// Text that does not fit the hint falls back to [`Value::decode_cell`].
    pub fn decode_cell_as(text: &str, hint: FieldType) -> Self {
        if hint == FieldType::String {
            return Value::String(text.to_string());
        }
        if text.is_empty() {
            return Value::Null;
        }

        let typed = match hint {
            FieldType::Number => parse_number(text).map(Value::Number),
            FieldType::Boolean => match text {
                "true" => Some(Value::Boolean(true)),
                "false" => Some(Value::Boolean(false)),
                _ => None,
            },
            FieldType::Json => serde_json::from_str(text).ok().map(Value::from_json),
            FieldType::String => None,
        };

        typed.unwrap_or_else(|| Value::decode_cell(text))
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

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    /// Non-finite numbers have no text form and become `Null`.
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::from_json(v)
    }
}

/// Quote text if it contains a comma, quote or line break.
///
/// Internal quotes are doubled.
pub fn quote_cell(text: &str) -> Cow<'_, str> {
    if text.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", text.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(text)
    }
}

/// Parse text that is entirely a decimal number.
///
/// Integers keep their integer form; everything else must be a finite f64.
fn parse_number(text: &str) -> Option<serde_json::Number> {
    if text.is_empty()
        || !text.bytes().any(|b| b.is_ascii_digit())
        || !text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }

    if let Ok(i) = text.parse::<i64>() {
        return Some(i.into());
    }
    if let Ok(u) = text.parse::<u64>() {
        return Some(u.into());
    }
    text.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn encode_plain_values() {
        assert_eq!(Value::from("Widget").encode_cell(), "Widget");
        assert_eq!(Value::from(42).encode_cell(), "42");
        assert_eq!(Value::from(json!(9.99)).encode_cell(), "9.99");
        assert_eq!(Value::from(true).encode_cell(), "true");
        assert_eq!(Value::Null.encode_cell(), "");
        assert_eq!(Value::from("").encode_cell(), "");
    }

    #[test]
    fn encode_quotes_special_characters() {
        assert_eq!(
            Value::from("Gadget, Deluxe").encode_cell(),
            "\"Gadget, Deluxe\""
        );
        assert_eq!(
            Value::from("say \"hi\"").encode_cell(),
            "\"say \"\"hi\"\"\""
        );
        assert_eq!(Value::from("two\nlines").encode_cell(), "\"two\nlines\"");
        assert_eq!(Value::from("cr\rhere").encode_cell(), "\"cr\rhere\"");
    }

    #[test]
    fn encode_structured_is_compact_and_quoted() {
        let v = Value::from(json!({"a": 1, "b": [true, "x"]}));
        assert_eq!(v.encode_cell(), r#""{""a"":1,""b"":[true,""x""]}""#);

        // Quoting follows the string rule, not the type
        let v = Value::from(json!([1]));
        assert_eq!(v.encode_cell(), "[1]");
    }

    #[test]
    fn decode_priority_order() {
        assert_eq!(
            Value::decode_cell(r#"{"a":1}"#),
            Value::Structured(json!({"a": 1}))
        );
        assert_eq!(Value::decode_cell("[1,2]"), Value::Structured(json!([1, 2])));
        assert_eq!(Value::decode_cell("true"), Value::Boolean(true));
        assert_eq!(Value::decode_cell("false"), Value::Boolean(false));
        assert_eq!(Value::decode_cell("9.99"), Value::from(json!(9.99)));
        assert_eq!(Value::decode_cell("-3"), Value::from(-3));
        assert_eq!(Value::decode_cell("Widget"), Value::from("Widget"));
        assert_eq!(Value::decode_cell(""), Value::from(""));
    }

    #[test]
    fn malformed_structured_falls_back_to_string() {
        assert_eq!(Value::decode_cell("{not json"), Value::from("{not json"));
        assert_eq!(Value::decode_cell("[1,"), Value::from("[1,"));
    }

    #[test]
    fn non_decimal_text_is_not_a_number() {
        for text in ["inf", "NaN", "infinity", " 12", "12 ", "0x1F", "1_000", "-", "e", "."] {
            assert_eq!(Value::decode_cell(text), Value::from(text), "{text}");
        }
        assert_eq!(Value::decode_cell("1e3"), Value::from(json!(1000.0)));
        assert_eq!(Value::decode_cell("True"), Value::from("True"));
    }

    #[test]
    fn large_integers_keep_integer_form() {
        let v = Value::decode_cell("18446744073709551615");
        assert_eq!(v.encode_cell(), "18446744073709551615");
    }

    #[test]
    fn number_text_is_stable() {
        for text in ["0", "7", "-12", "9.99", "19.5", "1.0", "0.30000000000000004"] {
            assert_eq!(Value::decode_cell(text).encode_cell(), text);
        }
    }

    #[test]
    fn typed_decode_resolves_ambiguity() {
        assert_eq!(
            Value::decode_cell_as("42", FieldType::String),
            Value::from("42")
        );
        assert_eq!(
            Value::decode_cell_as("true", FieldType::String),
            Value::from("true")
        );
        assert_eq!(Value::decode_cell_as("42", FieldType::Number), Value::from(42));
        assert_eq!(Value::decode_cell_as("", FieldType::Number), Value::Null);
        assert_eq!(Value::decode_cell_as("", FieldType::String), Value::from(""));
        assert_eq!(
            Value::decode_cell_as("\"quoted\"", FieldType::Json),
            Value::from("quoted")
        );
    }

    #[test]
    fn typed_decode_falls_back_on_mismatch() {
        assert_eq!(
            Value::decode_cell_as("n/a", FieldType::Number),
            Value::from("n/a")
        );
        assert_eq!(
            Value::decode_cell_as("yes", FieldType::Boolean),
            Value::from("yes")
        );
    }

    #[test]
    fn json_conversion() {
        assert_eq!(Value::from_json(json!(null)), Value::Null);
        assert_eq!(Value::from_json(json!("x")).into_json(), json!("x"));
        assert_eq!(Value::from_json(json!({"k": [1]})).into_json(), json!({"k": [1]}));
        assert_eq!(Value::from(json!(3)).field_type(), Some(FieldType::Number));
        assert_eq!(Value::Null.field_type(), None);
    }
}
