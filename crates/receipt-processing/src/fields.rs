//! Schema-driven field validation.
//!
//! Every rule is evaluated even after a violation so the caller receives all
//! messages at once. Lengths are counted in UTF-16 code units, the unit used
//! by the `maxlength` attribute of the client form.

use receipt_core::{AcceptedValue, FieldRule, FieldValue, SubmissionInput, ValidationOutcome};
use serde_json::Value;

fn display_length(value: &str) -> usize {
    value.encode_utf16().count()
}

fn required_message(name: &str) -> String {
    format!("\"{}\" is required.", name)
}

/// Validate `input` against an ordered schema.
///
/// Accepted values keep schema order; optional fields that are absent or
/// empty strings contribute nothing.
pub fn validate_fields(input: &SubmissionInput, schema: &[FieldRule]) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();

    for rule in schema {
        match check_rule(rule, input.get(&rule.name)) {
            Ok(Some(value)) => outcome.values.push(AcceptedValue {
                name: rule.name.clone(),
                value,
            }),
            Ok(None) => {}
            Err(message) => outcome.errors.push(message),
        }
    }

    if !outcome.is_valid() {
        tracing::debug!(
            errors = outcome.errors.len(),
            accepted = outcome.values.len(),
            "Field validation failed"
        );
    }

    outcome
}

fn check_rule(rule: &FieldRule, value: Option<&FieldValue>) -> Result<Option<String>, String> {
    let FieldRule {
        name,
        max_length,
        required,
    } = rule;

    match value {
        None if *required => Err(required_message(name)),
        None => Ok(None),

        Some(FieldValue::Text(text)) => {
            if *required && text.trim().is_empty() {
                return Err(required_message(name));
            }
            if display_length(text) > *max_length {
                return Err(format!(
                    "\"{}\" is too long. Maximum length is {}.",
                    name, max_length
                ));
            }
            Ok((!text.is_empty()).then(|| text.clone()))
        }

        Some(FieldValue::List(items)) => {
            if *required && items.is_empty() {
                return Err(required_message(name));
            }
            let parts: Option<Vec<&str>> = items.iter().map(Value::as_str).collect();
            let Some(parts) = parts else {
                return Err(format!("\"{}\" contains non-string elements.", name));
            };
            let joined = parts.join(",");
            if display_length(&joined) > *max_length {
                return Err(format!(
                    "\"{}\" is too long. Maximum length is {} (after joining array elements).",
                    name, max_length
                ));
            }
            Ok(Some(joined))
        }

        Some(FieldValue::Other(_)) => Err(format!(
            "\"{}\" has an invalid type. Expected string or array of strings.",
            name
        )),
    }
}
