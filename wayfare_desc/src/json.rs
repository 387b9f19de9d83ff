//! JSON bridge for the value tree.

use wayfare_data::{Map, Value};

/// Serialize a tree to the on-disk JSON shape: UTF-8, unescaped non-ASCII,
/// 2-space indentation. Callers writing files append the trailing newline.
pub fn to_json_string(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

/// Convert a decoded JSON document into a [`Value`] tree. Numbers become
/// [`Value::Integer`] when representable as `i64`, otherwise [`Value::Float`].
pub fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Null
            }
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::Array(items.into_iter().map(from_json).collect()),
        serde_json::Value::Object(map) => {
            let mut out = Map::new();
            for (k, v) in map {
                out.insert(k, from_json(v));
            }
            Value::Object(out)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_split_on_representability() {
        let v = from_json(serde_json::json!([1, 2.5, -3]));
        assert_eq!(
            v,
            Value::Array(vec![Value::Integer(1), Value::Float(2.5), Value::Integer(-3)])
        );
    }

    #[test]
    fn float_valued_integers_stay_floats() {
        let v = from_json(serde_json::json!(5.0));
        assert_eq!(v, Value::Float(5.0));
    }

    #[test]
    fn pretty_output_uses_two_space_indent_and_raw_unicode() {
        let mut map = Map::new();
        map.insert("name".to_string(), Value::String("Горы".to_string()));
        let json = to_json_string(&Value::Object(map));
        assert_eq!(json, "{\n  \"name\": \"Горы\"\n}");
    }
}
