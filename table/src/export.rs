//! CSV serialization of the current table view.

use std::borrow::Cow;

use serde_json::Value;

use crate::column::Column;
use crate::record::coerce_str;

/// Serialize `rows` (the full filtered + sorted view, not just the current
/// page) to CSV.
///
/// The header row uses raw column keys, and cells are raw-value string
/// coercions; custom `render` transforms never apply to exports. Fields are
/// quoted per RFC 4180 when they contain a comma, quote, or line break.
pub fn write_csv(columns: &[Column], rows: &[&Value]) -> String {
    let mut out = String::new();

    let header = columns
        .iter()
        .map(|column| escape_field(column.key.as_str()))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&header);
    out.push('\n');

    for row in rows {
        let line = columns
            .iter()
            .map(|column| {
                let raw = column.raw_value(row).cloned().unwrap_or(Value::Null);
                escape_field(&coerce_str(&raw)).into_owned()
            })
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }

    out
}

fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains(['"', ',', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
