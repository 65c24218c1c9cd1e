//! Row record helpers: path resolution and string coercion.
//!
//! Row records are `serde_json::Value` objects. The engine assumes no schema
//! beyond the property paths column descriptors reference, so everything here
//! operates on dynamic values with a safe "missing" fallback.

use log::warn;
use serde::Serialize;
use serde_json::Value;

/// Convert any serializable slice into row records.
///
/// Items that do not serialize to a JSON object are dropped with a warning;
/// the table cannot address properties on scalars.
pub fn rows_from<T: Serialize>(items: &[T]) -> Vec<Value> {
    items
        .iter()
        .filter_map(|item| match serde_json::to_value(item) {
            Ok(value @ Value::Object(_)) => Some(value),
            Ok(other) => {
                warn!("table row is not an object, dropping: {other}");
                None
            }
            Err(err) => {
                warn!("table row failed to serialize, dropping: {err}");
                None
            }
        })
        .collect()
}

/// Resolve a dot-separated property path against a row record.
///
/// Returns `None` when any segment is absent. A present-but-null property
/// resolves to `Some(&Value::Null)`; sorting and display treat both the same.
pub fn resolve_path<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Coerce a raw value to its display/export string.
///
/// Strings are used verbatim (no surrounding quotes), null becomes the empty
/// string, and everything else uses its JSON representation.
pub fn coerce_str(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Append the lowercased string representation of every leaf property of
/// `record` to `out`, separated by `\u{0}` so values cannot run together.
///
/// This feeds the search operation, which matches against all properties of
/// a row, not only the displayed columns.
pub(crate) fn flatten_for_search(record: &Value, out: &mut String) {
    match record {
        Value::Null => {}
        Value::Object(map) => {
            for value in map.values() {
                flatten_for_search(value, out);
            }
        }
        Value::Array(items) => {
            for value in items {
                flatten_for_search(value, out);
            }
        }
        Value::String(s) => {
            out.push_str(&s.to_lowercase());
            out.push('\u{0}');
        }
        other => {
            out.push_str(&other.to_string().to_lowercase());
            out.push('\u{0}');
        }
    }
}

/// True when the lowercased `term` occurs in any property of `record`.
pub(crate) fn matches_search(record: &Value, lowercased_term: &str) -> bool {
    let mut haystack = String::new();
    flatten_for_search(record, &mut haystack);
    haystack.contains(lowercased_term)
}
