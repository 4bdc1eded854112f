//! Payload values and the truthiness rules shared by every stage.
//!
//! Payloads, output mappings, and view values are plain JSON values. A
//! value counts as "empty" when it is falsy: missing, `null`, `false`, `0`,
//! `NaN`, or the empty string. Arrays and objects are always truthy, even
//! when empty.

use serde_json::{Map, Value};

/// A mapping from field name to raw or processed value.
///
/// Insertion order is preserved, so output mappings list fields in
/// definition order.
pub type Payload = Map<String, Value>;

/// Returns `true` if the value is truthy.
///
/// # Examples
///
/// ```
/// use formflow_forms::value::is_truthy;
/// use serde_json::json;
///
/// assert!(is_truthy(&json!("Ann")));
/// assert!(is_truthy(&json!([])));
/// assert!(!is_truthy(&json!(0)));
/// assert!(!is_truthy(&json!("")));
/// assert!(!is_truthy(&json!(false)));
/// ```
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Looks up a field's value, treating a missing key as `null`.
pub fn lookup<'a>(payload: &'a Payload, name: &str) -> &'a Value {
    payload.get(name).unwrap_or(&Value::Null)
}

/// Returns the field's value if present and not `null`.
pub fn present<'a>(payload: &'a Payload, name: &str) -> Option<&'a Value> {
    payload.get(name).filter(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_falsy_values() {
        for value in [json!(null), json!(false), json!(0), json!(0.0), json!(-0.0), json!("")] {
            assert!(!is_truthy(&value), "{value} should be falsy");
        }
    }

    #[test]
    fn test_truthy_values() {
        for value in [json!(true), json!(1), json!(-3), json!(0.5), json!("0"), json!(" "), json!([]), json!({})] {
            assert!(is_truthy(&value), "{value} should be truthy");
        }
    }

    #[test]
    fn test_lookup_missing_is_null() {
        let payload = Payload::new();
        assert_eq!(lookup(&payload, "name"), &Value::Null);
    }

    #[test]
    fn test_present_skips_null() {
        let mut payload = Payload::new();
        payload.insert("a".into(), Value::Null);
        payload.insert("b".into(), json!(0));
        assert!(present(&payload, "a").is_none());
        assert!(present(&payload, "missing").is_none());
        assert_eq!(present(&payload, "b"), Some(&json!(0)));
    }
}
