// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Number helpers shared by the transforms and the emitter.
//!
//! Style values are loosely typed: a width may arrive as `2`, `2.5` or `"2"`.
//! These helpers coerce and format them the same way everywhere so that
//! `2.0` prints as `2` and `"1"` compares equal to `1`.

use serde_json::{Number, Value};

/// Largest integer an `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Build a JSON number, preferring the integer representation when exact.
///
/// Non-finite inputs become `null`.
pub fn number_value(v: f64) -> Value {
    if v.is_finite() && v.fract() == 0.0 && v.abs() <= MAX_SAFE_INTEGER {
        return Value::from(v as i64);
    }
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

/// Format an `f64` without a trailing `.0` for integral values.
pub fn format_f64(v: f64) -> String {
    if v == 0.0 {
        // covers -0.0
        return "0".to_owned();
    }
    format!("{v}")
}

/// Format a JSON number the way [`format_f64`] does.
pub fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map_or_else(|| n.to_string(), format_f64)
    }
}

/// Loose numeric coercion: numbers, numeric strings and booleans.
///
/// Arrays, objects and `null` have no numeric reading.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Render a scalar as the text a string concatenation would produce.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(format_number(n)),
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Truthiness of a loosely typed value (`false`, `0`, `""`, `null` are false).
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn integral_floats_become_integers() {
        assert_eq!(number_value(3.0), json!(3));
        assert_eq!(number_value(2.5), json!(2.5));
        assert_eq!(number_value(f64::NAN), Value::Null);
    }

    #[test]
    fn formatting_drops_trailing_zero() {
        assert_eq!(format_f64(2.0), "2");
        assert_eq!(format_f64(-0.0), "0");
        assert_eq!(format_f64(0.25), "0.25");
        assert_eq!(format_number(&Number::from(7)), "7");
    }

    #[test]
    fn coercion_matches_loose_rules() {
        assert_eq!(coerce_f64(&json!("1")), Some(1.0));
        assert_eq!(coerce_f64(&json!(" 0.5 ")), Some(0.5));
        assert_eq!(coerce_f64(&json!(true)), Some(1.0));
        assert_eq!(coerce_f64(&json!([[1, 2]])), None);
        assert_eq!(coerce_f64(&json!("abc")), None);
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!([])));
    }
}
