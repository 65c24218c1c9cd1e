//! Sort state and the row comparison used by the engine.

use std::cmp::Ordering;

use serde_json::Value;
use ustr::Ustr;

/// Direction of the single active sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// The opposite direction; toggling cycles `Asc -> Desc -> Asc`.
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// The currently active sort, if any. Only one column sorts at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: Ustr,
    pub direction: SortDirection,
}

impl SortState {
    pub fn ascending(key: Ustr) -> Self {
        Self {
            key,
            direction: SortDirection::Asc,
        }
    }
}

/// Compare two raw cell values for ordering.
///
/// Values are compared as lowercase strings. Missing and null values sort
/// after all defined values in *both* directions; the direction only flips
/// the ordering of defined values.
pub fn compare_values(
    a: Option<&Value>,
    b: Option<&Value>,
    direction: SortDirection,
) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let a = sort_key(a);
            let b = sort_key(b);
            match direction {
                SortDirection::Asc => a.cmp(&b),
                SortDirection::Desc => b.cmp(&a),
            }
        }
    }
}

fn sort_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_lowercase(),
        other => other.to_string().to_lowercase(),
    }
}
