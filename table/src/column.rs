//! Column descriptors for the data table engine.

use std::sync::Arc;

use bon::Builder;
use serde_json::Value;
use ustr::Ustr;

/// Custom cell renderer: `(raw value, full row record, row index) -> text`.
///
/// The raw value is the result of resolving the column's key path against the
/// row; `Value::Null` stands in for a missing property.
pub type RenderFn = Arc<dyn Fn(&Value, &Value, usize) -> String + Send + Sync>;

/// Horizontal alignment hint for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Describes one table column.
///
/// `key` is a dot-separated property path resolved against every row record
/// (`"employee.name"` reads `row["employee"]["name"]`). Rows where the path
/// does not resolve render an empty cell. Two columns sharing a key is
/// undefined behavior; the last one wins wherever it matters.
#[derive(Clone, Builder)]
pub struct Column {
    /// Property path into the row record. Must be unique per table.
    #[builder(into)]
    pub key: Ustr,

    /// Human-readable header title.
    #[builder(into)]
    pub title: String,

    /// Fixed width hint in pixels; `None` lets the host layout decide.
    pub width: Option<f32>,

    /// Whether [`TableView::toggle_sort`](crate::TableView::toggle_sort) is
    /// allowed to sort on this column. Sorting a non-sortable column is a
    /// no-op.
    #[builder(default)]
    pub sortable: bool,

    /// Alignment hint for the host renderer.
    pub align: Option<Align>,

    /// Optional display transform. Applies to on-screen cells only; CSV
    /// export always uses the raw value.
    pub render: Option<RenderFn>,
}

impl Column {
    /// Resolve this column's raw value on `row`.
    pub fn raw_value<'a>(&self, row: &'a Value) -> Option<&'a Value> {
        crate::record::resolve_path(row, &self.key)
    }

    /// Compute the display text for a cell, applying `render` when present.
    pub fn cell_text(&self, row: &Value, index: usize) -> String {
        let raw = self.raw_value(row).cloned().unwrap_or(Value::Null);
        match &self.render {
            Some(render) => render(&raw, row, index),
            None => crate::record::coerce_str(&raw),
        }
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("width", &self.width)
            .field("sortable", &self.sortable)
            .field("align", &self.align)
            .field("render", &self.render.is_some())
            .finish()
    }
}
