//! Outbound wire-casing transform.
//!
//! The backend expects PascalCase member names while the client works in
//! camelCase. The transform applies on *write only*; responses are already
//! in the client's convention. This asymmetry is load-bearing for wire
//! compatibility and must not be "fixed".

use serde_json::{Map, Value};

/// PascalCase every object key of `value`, recursively.
///
/// Null and empty-string members are excluded from the payload; `0` and
/// `false` are meaningful and always kept. Arrays are transformed
/// element-wise, scalars pass through untouched.
pub fn pascal_case_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (key, member) in map {
                if member.is_null() {
                    continue;
                }
                if matches!(member, Value::String(s) if s.is_empty()) {
                    continue;
                }
                out.insert(pascal_case(key), pascal_case_keys(member));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(pascal_case_keys).collect()),
        other => other.clone(),
    }
}

fn pascal_case(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
