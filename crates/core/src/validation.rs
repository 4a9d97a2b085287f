//! Schema-style validation rules for JSON documents.
//!
//! Requests arrive as loosely-typed JSON documents. The rules here check one
//! value at a time and report failures as short messages (`max length is 100`,
//! `must be of integer type`) that callers collect per field into
//! [`FieldErrors`].

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// A JSON object as received on the wire.
pub type Document = serde_json::Map<String, Value>;

pub const REQUIRED_FIELD: &str = "required field";
pub const UNKNOWN_FIELD: &str = "unknown field";

/// Per-field validation messages, serialized as `{"field": ["message", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// First failing field (in field-name order) and its first message.
    pub fn first(&self) -> Option<(&str, &str)> {
        self.0
            .iter()
            .find_map(|(field, msgs)| msgs.first().map(|m| (field.as_str(), m.as_str())))
    }
}

/// View a value as a JSON object.
pub fn as_document(value: &Value) -> Option<&Document> {
    value.as_object()
}

/// Value must be a string whose length in characters lies within `min_len..=max_len`.
pub fn string_within(value: &Value, min_len: usize, max_len: usize) -> Result<String, String> {
    let s = value.as_str().ok_or_else(|| "must be of string type".to_string())?;
    let len = s.chars().count();
    if len < min_len {
        return Err(format!("min length is {min_len}"));
    }
    if len > max_len {
        return Err(format!("max length is {max_len}"));
    }
    Ok(s.to_string())
}

/// Value must be a string; no length rules.
pub fn any_string(value: &Value) -> Result<String, String> {
    string_within(value, 0, usize::MAX)
}

/// Value must be a JSON number (integers included) and at least `min`.
pub fn number_at_least(value: &Value, min: f64) -> Result<f64, String> {
    let n = value.as_f64().ok_or_else(|| "must be of float type".to_string())?;
    if n < min {
        return Err(format!("min value is {min}"));
    }
    Ok(n)
}

/// Value must be a JSON integer (no fractional form such as `2.0`) and at least `min`.
pub fn integer_at_least(value: &Value, min: i64) -> Result<i64, String> {
    let n = match value.as_i64() {
        Some(n) => n,
        None if value.is_u64() => return Err(format!("max value is {}", i64::MAX)),
        None => return Err("must be of integer type".to_string()),
    };
    if n < min {
        return Err(format!("min value is {min}"));
    }
    Ok(n)
}
