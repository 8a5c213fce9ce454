//! Per-item parameter bag and the coercions the resolver applies to it.
//!
//! Hosts hand over plain JSON values. Every accessor here treats "absent",
//! `null`, an empty string and an empty list the same way: as unset.

use serde_json::{Map, Value};

use crate::UploadPostError;

/// Split a comma-separated list, trimming every element and dropping the
/// empty ones. `""` yields an empty vector, never `[""]`.
pub fn split_comma_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Flat `name → value` view of one item's node parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterBag {
    values: Map<String, Value>,
}

impl From<Map<String, Value>> for ParameterBag {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl ParameterBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bag from a JSON object. Any other JSON value yields an empty bag.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Object(values) => Self { values },
            _ => Self::default(),
        }
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Non-blank text. Numbers are accepted and stringified.
    pub fn text(&self, name: &str) -> Result<Option<String>, UploadPostError> {
        match self.raw(name) {
            None => Ok(None),
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(UploadPostError::invalid(
                name,
                format!("expected text, got {}", type_name(other)),
            )),
        }
    }

    /// A boolean, or the strings `true` / `false`.
    pub fn flag(&self, name: &str) -> Result<Option<bool>, UploadPostError> {
        match self.raw(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) => match s.trim() {
                "" => Ok(None),
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                other => Err(UploadPostError::invalid(
                    name,
                    format!("expected true or false, got '{other}'"),
                )),
            },
            Some(other) => Err(UploadPostError::invalid(
                name,
                format!("expected a boolean, got {}", type_name(other)),
            )),
        }
    }

    /// A whole number, or a string holding one.
    pub fn integer(&self, name: &str) -> Result<Option<i64>, UploadPostError> {
        let not_integer = |shown: String| {
            UploadPostError::invalid(name, format!("expected a whole number, got {shown}"))
        };

        match self.raw(name) {
            None => Ok(None),
            Some(Value::Number(n)) => match n.as_i64() {
                Some(i) => Ok(Some(i)),
                None => match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(Some(f as i64)),
                    _ => Err(not_integer(n.to_string())),
                },
            },
            Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(Value::String(s)) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| not_integer(format!("'{s}'"))),
            Some(other) => Err(not_integer(type_name(other).to_owned())),
        }
    }

    /// A comma-separated string or an array of strings, trimmed, blanks
    /// removed. An empty result is reported as unset.
    pub fn list(&self, name: &str) -> Result<Option<Vec<String>>, UploadPostError> {
        let items = match self.raw(name) {
            None => return Ok(None),
            Some(Value::String(s)) => split_comma_list(s),
            Some(Value::Array(values)) => {
                let mut items = Vec::with_capacity(values.len());
                for value in values {
                    match value {
                        Value::String(s) if !s.trim().is_empty() => items.push(s.trim().to_owned()),
                        Value::String(_) | Value::Null => {}
                        Value::Number(n) => items.push(n.to_string()),
                        other => {
                            return Err(UploadPostError::invalid(
                                name,
                                format!("list entries must be text, got {}", type_name(other)),
                            ))
                        }
                    }
                }
                items
            }
            Some(other) => {
                return Err(UploadPostError::invalid(
                    name,
                    format!("expected a list, got {}", type_name(other)),
                ))
            }
        };

        Ok(if items.is_empty() { None } else { Some(items) })
    }

    /// Raw entries of a parameter that may hold one value or several, with
    /// order preserved and blanks kept. Used for media inputs.
    pub fn entries(&self, name: &str) -> Result<Vec<String>, UploadPostError> {
        match self.raw(name) {
            None => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(vec![s.clone()]),
            Some(Value::Array(values)) => values
                .iter()
                .filter(|v| !v.is_null())
                .map(|v| match v {
                    Value::String(s) => Ok(s.clone()),
                    other => Err(UploadPostError::invalid(
                        name,
                        format!("entries must be text, got {}", type_name(other)),
                    )),
                })
                .collect(),
            Some(other) => Err(UploadPostError::invalid(
                name,
                format!("expected text or a list of text, got {}", type_name(other)),
            )),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
