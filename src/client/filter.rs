//! PocketBase filter literals for equality lookups.

use serde_json::Value;

/// `field = <literal>` for an upsert lookup.
///
/// Strings are double-quoted with embedded quotes escaped; arrays and objects
/// are matched against their compact JSON text.
pub fn build_filter(field: &str, value: &Value) -> String {
    match value {
        Value::Null => format!("{} = null", field),
        Value::Bool(b) => format!("{} = {}", field, b),
        Value::Number(n) => format!("{} = {}", field, n),
        Value::String(s) => format!("{} = \"{}\"", field, escape(s)),
        other => format!("{} = \"{}\"", field, escape(&other.to_string())),
    }
}

fn escape(text: &str) -> String {
    text.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_literals() {
        assert_eq!(build_filter("deleted", &Value::Null), "deleted = null");
        assert_eq!(build_filter("active", &json!(true)), "active = true");
        assert_eq!(build_filter("count", &json!(42)), "count = 42");
        assert_eq!(build_filter("price", &json!(9.5)), "price = 9.5");
    }

    #[test]
    fn test_string_quotes_are_escaped() {
        assert_eq!(build_filter("email", &json!("a@b.c")), r#"email = "a@b.c""#);
        assert_eq!(
            build_filter("title", &json!(r#"say "hi""#)),
            r#"title = "say \"hi\"""#
        );
    }
}
