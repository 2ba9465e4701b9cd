//! Query String Encoding
//!
//! Flattens a JSON payload into form-urlencoded pairs for read and delete.

use serde_json::Value;
use url::Url;

/// Flattens a payload into ordered `(key, value)` pairs.
///
/// Strings pass through, numbers and booleans use their text form, null and
/// nested objects become an empty value, and arrays repeat the key once per
/// element. A non-object payload yields no pairs.
pub fn query_pairs(payload: &Value) -> Vec<(String, String)> {
    let Value::Object(map) = payload else {
        return Vec::new();
    };

    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    let mut pairs = Vec::with_capacity(keys.len());
    for key in keys {
        match &map[key.as_str()] {
            Value::Array(items) => {
                for item in items {
                    pairs.push((key.clone(), primitive(item)));
                }
            }
            value => pairs.push((key.clone(), primitive(value))),
        }
    }
    pairs
}

/// Encodes a payload as a query string without the leading `?`.
pub fn encode_query(payload: &Value) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query_pairs(payload))
        .finish()
}

/// Appends the payload's pairs to any query already on `url`.
pub fn append_query(url: &mut Url, payload: &Value) {
    let pairs = query_pairs(payload);
    if pairs.is_empty() {
        return;
    }
    url.query_pairs_mut().extend_pairs(pairs);
}

fn primitive(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}
