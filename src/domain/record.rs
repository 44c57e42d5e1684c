//! Record model
//!
//! A record is an ordered mapping from field name to a scalar or nested JSON
//! value. Insertion order is preserved (`serde_json` is built with
//! `preserve_order`), so transformed output lists fields in the caller's order.

use serde_json::{Map, Value};

/// Ordered field-name-to-value mapping processed by the privacy engine
pub type Record = Map<String, Value>;

/// Returns the UTF-8 text a keyed transform operates on
///
/// Strings contribute their contents; every other value contributes its
/// compact JSON text (`42`, `true`, `{"a":1}`).
pub fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether a value takes part in numeric transforms
///
/// Booleans are not numeric.
pub fn is_numeric(value: &Value) -> bool {
    matches!(value, Value::Number(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_text_string_is_unquoted() {
        assert_eq!(field_text(&json!("a@b.com")), "a@b.com");
    }

    #[test]
    fn test_field_text_non_string_is_json() {
        assert_eq!(field_text(&json!(42)), "42");
        assert_eq!(field_text(&json!(true)), "true");
        assert_eq!(field_text(&json!({"city": "Oslo"})), r#"{"city":"Oslo"}"#);
    }

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric(&json!(1)));
        assert!(is_numeric(&json!(1.5)));
        assert!(!is_numeric(&json!("1")));
        assert!(!is_numeric(&json!(true)));
        assert!(!is_numeric(&Value::Null));
    }

    #[test]
    fn test_record_preserves_insertion_order() {
        let mut record = Record::new();
        record.insert("zeta".to_string(), json!(1));
        record.insert("alpha".to_string(), json!(2));
        let keys: Vec<&String> = record.keys().collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }
}
