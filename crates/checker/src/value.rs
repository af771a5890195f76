// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Typed accessors over parsed YAML trees.

use serde_yaml::{Mapping, Value};

use crate::error::ShapeError;

pub trait ValueExt {
    fn as_dict(&self, what: &str) -> Result<&Mapping, ShapeError>;
    fn as_string(&self, what: &str) -> Result<&str, ShapeError>;
    /// Entries of a list, or the keys of a mapping.
    fn as_names(&self, what: &str) -> Result<Vec<String>, ShapeError>;
}

fn mismatch(what: &str, expected: &'static str) -> ShapeError {
    ShapeError {
        what: what.to_string(),
        expected,
    }
}

impl ValueExt for Value {
    fn as_dict(&self, what: &str) -> Result<&Mapping, ShapeError> {
        self.as_mapping().ok_or_else(|| mismatch(what, "dict"))
    }

    fn as_string(&self, what: &str) -> Result<&str, ShapeError> {
        self.as_str().ok_or_else(|| mismatch(what, "string"))
    }

    fn as_names(&self, what: &str) -> Result<Vec<String>, ShapeError> {
        match self {
            Value::Sequence(items) => Ok(items.iter().map(key_name).collect()),
            Value::Mapping(map) => Ok(map.keys().map(key_name).collect()),
            _ => Err(mismatch(what, "list")),
        }
    }
}

/// Text of a string, number or boolean. `None` for anything else.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Renders a mapping key (or scalar) the way it was written.
pub fn key_name(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Tagged(tagged) => key_name(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}
