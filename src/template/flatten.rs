//! Turns a mapping into `[key, value]` rows so templates can iterate over it.

use serde_json::{Map, Value};

/// Converts a mapping's entries into `[key, value]` pairs, in iteration order.
///
/// # Example
/// ```rust
/// use serde_json::json;
/// use wzs_mailer::template::flatten::flatten;
///
/// let map = json!({"a": 1, "b": 2});
/// let rows = flatten(map.as_object().unwrap());
/// assert_eq!(rows, vec![json!(["a", 1]), json!(["b", 2])]);
/// ```
pub fn flatten(map: &Map<String, Value>) -> Vec<Value> {
    map.iter()
        .map(|(key, value)| Value::Array(vec![Value::String(key.clone()), value.clone()]))
        .collect()
}

/// Flattens `value` if it is a mapping; other values cannot be flattened.
pub fn flatten_value(value: &Value) -> Option<Value> {
    value.as_object().map(|map| Value::Array(flatten(map)))
}
