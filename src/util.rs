use serde_json::Value;

/// Blankness rule shared by envelope writes and presence validation.
///
/// Mirrors the usual "present" notion for loosely-typed inputs: `null`,
/// `false`, whitespace-only strings, and empty collections are blank.
pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(_) => false,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_and_false_are_blank() {
        assert!(is_blank(&Value::Null));
        assert!(is_blank(&json!(false)));
        assert!(!is_blank(&json!(true)));
    }

    #[test]
    fn whitespace_strings_are_blank() {
        assert!(is_blank(&json!("")));
        assert!(is_blank(&json!("   ")));
        assert!(!is_blank(&json!("x")));
    }

    #[test]
    fn empty_collections_are_blank() {
        assert!(is_blank(&json!([])));
        assert!(is_blank(&json!({})));
        assert!(!is_blank(&json!([0])));
        assert!(!is_blank(&json!({"k": 1})));
        assert!(!is_blank(&json!(0)));
    }
}
