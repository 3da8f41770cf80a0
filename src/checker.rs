//! Output comparator
//!
//! Expected outputs are stored as strings that may themselves encode JSON
//! (array, number, boolean) or be literal text. Instead of a deep-equality
//! comparator for every possible return shape, both sides are pushed through
//! one canonical serialization and compared textually. Known approximation:
//! two structurally equal objects with different key order will mismatch;
//! target shapes are arrays and scalars, where this cannot happen.

use serde_json::{Number, Value};

/// Compare an actual result value against the raw expected-output string
pub fn compare_output(actual: &Value, expected_raw: &str) -> bool {
    let expected = parse_expected(expected_raw);
    canonical(actual) == canonical(&expected)
}

/// Parse the expected output: JSON if it parses, a literal string otherwise
fn parse_expected(raw: &str) -> Value {
    let normalized = normalize_text(raw);
    serde_json::from_str::<Value>(&normalized).unwrap_or(Value::String(normalized))
}

fn canonical(value: &Value) -> String {
    serde_json::to_string(&normalize_value(value)).unwrap_or_default()
}

/// Normalize a value before serialization: trim strings and unify their line
/// endings, collapse `-0` to `0`, and fold integer-valued floats so `6` and
/// `6.0` serialize identically.
fn normalize_value(value: &Value) -> Value {
    match value {
        Value::Number(n) => normalize_number(n),
        Value::String(s) => Value::String(normalize_text(s)),
        Value::Array(items) => Value::Array(items.iter().map(normalize_value).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), normalize_value(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn normalize_number(n: &Number) -> Value {
    if let Some(f) = n.as_f64() {
        if f == 0.0 {
            return Value::Number(Number::from(0));
        }
        // 2^53: beyond this f64 cannot represent every integer exactly
        if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
            return Value::Number(Number::from(f as i64));
        }
    }
    Value::Number(n.clone())
}

fn normalize_text(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compare_array() {
        assert!(compare_output(&json!([0, 1]), "[0,1]"));
        assert!(!compare_output(&json!([1, 0]), "[0,1]"));
    }

    #[test]
    fn test_compare_number() {
        assert!(compare_output(&json!(6), "6"));
        assert!(!compare_output(&json!(7), "6"));
    }

    #[test]
    fn test_compare_quoted_string() {
        assert!(compare_output(&json!("abc"), "\"abc\""));
    }

    #[test]
    fn test_compare_literal_string() {
        assert!(compare_output(&json!("olleh"), "olleh"));
    }

    #[test]
    fn test_compare_boolean() {
        assert!(compare_output(&json!(true), "true"));
        assert!(!compare_output(&json!(false), "true"));
    }

    #[test]
    fn test_trailing_whitespace_is_trimmed() {
        assert!(compare_output(&json!("abc\n"), "abc"));
        assert!(compare_output(&json!("abc"), "  abc  "));
    }

    #[test]
    fn test_line_endings_are_unified() {
        assert!(compare_output(&json!("a\nb"), "a\r\nb"));
    }

    #[test]
    fn test_negative_zero_equals_zero() {
        assert!(compare_output(&json!(-0.0), "0"));
    }

    #[test]
    fn test_integer_valued_float_matches_integer() {
        assert!(compare_output(&json!(6.0), "6"));
    }

    #[test]
    fn test_null_result() {
        assert!(compare_output(&Value::Null, "null"));
        assert!(!compare_output(&Value::Null, "[0,1]"));
    }

    #[test]
    fn test_nested_structures() {
        assert!(compare_output(&json!([[1, 2], [3]]), "[[1,2],[3]]"));
    }
}
