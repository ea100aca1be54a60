use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;

/// Defines one accepted input field.
///
/// The position of a rule inside a schema determines the position of its
/// accepted value in a [`ValidationOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub name: String,
    pub max_length: usize,
    pub required: bool,
}

impl FieldRule {
    pub fn new(name: impl Into<String>, max_length: usize, required: bool) -> Self {
        Self {
            name: name.into(),
            max_length,
            required,
        }
    }
}

/// Value supplied for a single named field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    /// Multi-value field such as a checkbox group. Elements are kept untyped
    /// so the validator can report non-string members.
    List(Vec<Value>),
    /// Anything else (numbers, booleans, objects).
    Other(Value),
}

impl FieldValue {
    /// Converts a JSON value; `null` is treated as an absent field.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Array(items) => Some(FieldValue::List(items.clone())),
            other => Some(FieldValue::Other(other.clone())),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        FieldValue::List(values.into_iter().map(Value::from).collect())
    }
}

/// Field name to value mapping for one request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionInput {
    fields: HashMap<String, FieldValue>,
}

impl SubmissionInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the input from a decoded request body, which must be a JSON object.
    pub fn from_json(body: &Value) -> Result<Self, AppError> {
        let object = body.as_object().ok_or_else(|| {
            AppError::InvalidInput("Submission body must be a JSON object.".to_string())
        })?;

        let fields = object
            .iter()
            .filter_map(|(name, value)| FieldValue::from_json(value).map(|v| (name.clone(), v)))
            .collect();

        Ok(Self { fields })
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Returns the field as a string slice when it was supplied as text.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// A value that passed its field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedValue {
    pub name: String,
    pub value: String,
}

/// Result of validating a [`SubmissionInput`] against a schema.
///
/// `values` follows schema order and only holds accepted fields; `errors`
/// holds one message per violated rule, also in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub values: Vec<AcceptedValue>,
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Accepted value for `name`, if that field produced one.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value.as_str())
    }

    /// Accepted values in schema order.
    pub fn value_strings(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|v| v.value.as_str())
    }
}
