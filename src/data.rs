//! Submission data passed to templates and recipient resolution.
//!
//! Data is a JSON object with string keys. Key order is the insertion order
//! (`serde_json` is built with `preserve_order`), so anything iterating over
//! the mapping sees entries the way the caller supplied them.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// A string-keyed submission payload.
pub type Data = Map<String, Value>;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("submission data must be a mapping, got {0}")]
    NotAMapping(&'static str),
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

/// Converts any serializable mapping (struct, `HashMap<K, V>`, `json!({..})`)
/// into [`Data`].
///
/// Map keys are stringified by `serde_json`, so integer or enum keys end up as
/// their string forms.
///
/// # Example
/// ```rust
/// use std::collections::BTreeMap;
/// use wzs_mailer::data::to_data;
///
/// let mut m = BTreeMap::new();
/// m.insert(1, "one");
/// let data = to_data(&m).unwrap();
/// assert_eq!(data["1"], "one");
/// ```
pub fn to_data<T: Serialize + ?Sized>(value: &T) -> Result<Data, DataError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(DataError::NotAMapping(kind_of(&other))),
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}
