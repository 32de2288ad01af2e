//! Executable value transforms.
//!
//! Each variant of [`Transform`] is the runtime behavior behind one
//! builtin formula. Unary string transforms operate on the stringified
//! operand; binary numeric transforms coerce both operands to numbers
//! (non-numeric values become 0) and combine them.
//!
//! [`transform_registry`] maps canonical formula names (and aliases) to
//! their transform, so adding a formula is a registration call rather
//! than a code edit to a dispatcher.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A builtin executable transform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Convert to uppercase.
    Upper,

    /// Convert to lowercase.
    Lower,

    /// Remove leading and trailing whitespace.
    Trim,

    /// Character count of the stringified operand.
    TextLength,

    /// Capitalize every word, lowercase the rest.
    ProperCase,

    /// Reverse the character sequence.
    Reverse,

    /// Uppercase the first character, lowercase the rest.
    Capitalize,

    /// Numeric addition of two operands.
    Add,

    /// Numeric subtraction of two operands.
    Subtract,

    /// Numeric multiplication of two operands.
    Multiply,
}

impl Transform {
    /// Whether this transform takes two operand columns.
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Add | Self::Subtract | Self::Multiply)
    }

    /// Apply a unary transform to a single cell value.
    pub fn apply_unary(&self, value: &Value) -> Value {
        let text = as_display_string(value);
        match self {
            Self::Upper => Value::String(text.to_uppercase()),
            Self::Lower => Value::String(text.to_lowercase()),
            Self::Trim => Value::String(text.trim().to_string()),
            Self::TextLength => Value::Number((text.chars().count() as u64).into()),
            Self::ProperCase => Value::String(proper_case(&text)),
            Self::Reverse => Value::String(text.chars().rev().collect()),
            Self::Capitalize => Value::String(capitalize(&text)),
            // Binary transforms are dispatched through apply_binary; a unary
            // call treats the single operand as the left side with 0 right.
            Self::Add | Self::Subtract | Self::Multiply => {
                self.apply_binary(value, &Value::Number(0.into()))
            }
        }
    }

    /// Apply a binary numeric transform to two cell values.
    pub fn apply_binary(&self, left: &Value, right: &Value) -> Value {
        let a = as_number(left);
        let b = as_number(right);
        let result = match self {
            Self::Add => a + b,
            Self::Subtract => a - b,
            Self::Multiply => a * b,
            // Unary transforms fall back to the left operand.
            _ => return self.apply_unary(left),
        };
        serde_json::Number::from_f64(result)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Stringify a cell value the way the preview renders it.
fn as_display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Coerce a cell value to a number; non-numeric values become 0.
fn as_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    }
}

fn proper_case(text: &str) -> String {
    text.split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

/// Build the canonical-name to transform map, aliases included.
pub fn transform_registry() -> HashMap<String, Transform> {
    let entries = [
        ("UPPER", Transform::Upper),
        ("LOWER", Transform::Lower),
        ("TRIM", Transform::Trim),
        ("TEXT_LENGTH", Transform::TextLength),
        ("LEN", Transform::TextLength),
        ("PROPER_CASE", Transform::ProperCase),
        ("TITLE_CASE", Transform::ProperCase),
        ("REVERSE", Transform::Reverse),
        ("CAPITALIZE", Transform::Capitalize),
        ("ADD", Transform::Add),
        ("SUBTRACT", Transform::Subtract),
        ("MULTIPLY", Transform::Multiply),
    ];
    entries
        .into_iter()
        .map(|(name, t)| (name.to_string(), t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_upper() {
        assert_eq!(
            Transform::Upper.apply_unary(&json!("hello")),
            json!("HELLO")
        );
    }

    #[test]
    fn test_reverse() {
        assert_eq!(Transform::Reverse.apply_unary(&json!("abc")), json!("cba"));
    }

    #[test]
    fn test_trim_and_lengths() {
        assert_eq!(
            Transform::Trim.apply_unary(&json!("  padded  ")),
            json!("padded")
        );
        assert_eq!(Transform::TextLength.apply_unary(&json!("héllo")), json!(5));
        // Numbers are stringified before measuring.
        assert_eq!(Transform::TextLength.apply_unary(&json!(1234)), json!(4));
    }

    #[test]
    fn test_proper_case_and_capitalize() {
        assert_eq!(
            Transform::ProperCase.apply_unary(&json!("john ronald reuel")),
            json!("John Ronald Reuel")
        );
        assert_eq!(
            Transform::Capitalize.apply_unary(&json!("hELLO WORLD")),
            json!("Hello world")
        );
    }

    #[test]
    fn test_binary_numeric_coercion() {
        // String operands are coerced.
        assert_eq!(
            Transform::Add.apply_binary(&json!("2"), &json!("3")),
            json!(5.0)
        );
        assert_eq!(
            Transform::Subtract.apply_binary(&json!(10), &json!(4)),
            json!(6.0)
        );
        assert_eq!(
            Transform::Multiply.apply_binary(&json!("2.5"), &json!(4)),
            json!(10.0)
        );
        // Non-numeric operand degrades to 0, not an error.
        assert_eq!(
            Transform::Add.apply_binary(&json!("oops"), &json!(3)),
            json!(3.0)
        );
    }

    #[test]
    fn test_registry_covers_aliases() {
        let registry = transform_registry();
        assert_eq!(registry.get("LEN"), registry.get("TEXT_LENGTH"));
        assert_eq!(registry.get("TITLE_CASE"), registry.get("PROPER_CASE"));
        assert!(registry.get("VLOOKUP").is_none());
    }
}
