//! The table component contract.
//!
//! Every dashboard screen constructs one of these and hands it to a
//! [`TableView`](crate::TableView). The field set is the one stable interface
//! between the engine and the UI layer; renaming or dropping a field here
//! breaks every screen.

use std::sync::Arc;

use bon::Builder;
use serde_json::Value;
use ustr::Ustr;

use crate::column::Column;
use crate::sort::SortState;

/// Invoked after [`TableView::toggle_sort`](crate::TableView::toggle_sort)
/// changes the active sort. `None` means the sort was cleared.
pub type SortCallback = Arc<dyn Fn(Option<SortState>) + Send + Sync>;

/// Invoked after the page or page size changes, with `(page, page_size)`.
pub type PaginationCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Construction contract for a table.
#[derive(Builder)]
pub struct TableSpec {
    /// Column descriptors, in display order.
    pub columns: Vec<Column>,

    /// The full row collection. Use [`rows_from`](crate::rows_from) to
    /// convert typed records.
    pub data: Vec<Value>,

    /// Host-driven loading flag, surfaced while a fetch is in flight.
    #[builder(default)]
    pub loading: bool,

    /// Initial page size.
    #[builder(default = 10)]
    pub page_size: usize,

    /// Notified when the visible page changes.
    pub on_pagination_change: Option<PaginationCallback>,

    /// Notified when the active sort changes.
    pub on_sort: Option<SortCallback>,

    /// Whether the host should render the search box.
    #[builder(default)]
    pub searchable: bool,

    /// Placeholder text for the search box.
    #[builder(into, default = "Search...".to_string())]
    pub search_placeholder: String,

    /// Whether the host should render the export button.
    #[builder(default)]
    pub exportable: bool,

    /// Base name for the exported file; `.csv` is appended.
    #[builder(into, default = "export".to_string())]
    pub export_file_name: String,

    /// Property path identifying a row uniquely (for host-side list keys).
    #[builder(into, default = Ustr::from("id"))]
    pub row_key: Ustr,
}

impl std::fmt::Debug for TableSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableSpec")
            .field("columns", &self.columns)
            .field("rows", &self.data.len())
            .field("loading", &self.loading)
            .field("page_size", &self.page_size)
            .field("searchable", &self.searchable)
            .field("exportable", &self.exportable)
            .field("export_file_name", &self.export_file_name)
            .field("row_key", &self.row_key)
            .finish()
    }
}
