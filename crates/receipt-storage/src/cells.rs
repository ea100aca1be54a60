//! Spreadsheet-style cell coercion.
//!
//! Configuration sections are edited by hand, so a cell may hold a string, a
//! number or a boolean. These helpers read cells the way a spreadsheet user
//! expects.

use serde_json::Value;

/// Cell rendered as trimmed text. Missing and `null` cells are empty.
pub fn text(row: &[Value], index: usize) -> String {
    match row.get(index) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    }
}

/// Truthiness of a cell: non-empty strings, non-zero numbers and `true`.
pub fn is_truthy(row: &[Value], index: usize) -> bool {
    match row.get(index) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Leading integer of a cell, `0` when none can be read.
pub fn leading_integer(row: &[Value], index: usize) -> usize {
    match row.get(index) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .map(|n| n as usize)
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let digits: String = s
                .trim_start()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().unwrap_or(0)
        }
        _ => 0,
    }
}
