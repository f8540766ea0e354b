use serde::Serialize;

/// Serializes a value into compact JSON.
///
/// Returns an empty string and logs a diagnostic if serialization fails;
/// callers that need the failure should use `serde_json` directly.
pub fn to_json<T: Serialize>(value: &T) -> String {
    match serde_json::to_string(value) {
        Ok(json) => json,
        Err(err) => {
            log::error!("Error serializing to JSON: {}", err);
            String::new()
        }
    }
}

/// Serializes a value into indented JSON.
pub fn to_json_pretty<T: Serialize>(value: &T) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(err) => {
            log::error!("Error serializing to JSON: {}", err);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Value;

    #[test]
    fn test_to_json_compact() {
        let value = Value::from_json(r#"{"a": 1}"#).unwrap();
        assert_eq!(to_json(&value), r#"{"a":1}"#);
    }

    #[test]
    fn test_to_json_pretty_indents() {
        let value = Value::from_json(r#"{"a": 1}"#).unwrap();
        let pretty = to_json_pretty(&value);
        assert!(pretty.contains('\n'));
        assert!(pretty.contains("\"a\": 1"));
    }
}
