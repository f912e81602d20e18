//! Typed field extraction from JSON request bodies.
//!
//! Every failure names the field it came from so rejections can be reported
//! back to the client as a [`ValidationError`].

use serde_json::Value;

use crate::error::ValidationError;

pub fn number(field: &str, value: &Value) -> Result<f64, ValidationError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ValidationError::new(field, "expected a number")),
        // Form-style clients send numbers as strings.
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::new(field, format!("expected a number, got {s:?}"))),
        other => Err(ValidationError::new(
            field,
            format!("expected a number, got {}", kind(other)),
        )),
    }
}

pub fn integer(field: &str, value: &Value) -> Result<i64, ValidationError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| ValidationError::new(field, format!("expected an integer, got {n}"))),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::new(field, format!("expected an integer, got {s:?}"))),
        other => Err(ValidationError::new(
            field,
            format!("expected an integer, got {}", kind(other)),
        )),
    }
}

pub fn string<'a>(field: &str, value: &'a Value) -> Result<&'a str, ValidationError> {
    value.as_str().ok_or_else(|| {
        ValidationError::new(field, format!("expected a string, got {}", kind(value)))
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
