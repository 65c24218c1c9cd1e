//! The table view: search, sort, and pagination over a row collection.

use log::warn;
use serde_json::Value;

use crate::NO_DATA_PLACEHOLDER;
use crate::column::Column;
use crate::contract::TableSpec;
use crate::export::write_csv;
use crate::pagination::{Pagination, page_slice};
use crate::record::matches_search;
use crate::sort::{SortState, compare_values};

/// In-memory view over a full row collection.
///
/// The view owns the interactive state (search term, active sort, current
/// page) and computes the visible subset on demand in a fixed order:
/// search filter, then sort, then page slice. CSV export covers the filtered
/// and sorted set, ignoring the page.
pub struct TableView {
    spec: TableSpec,
    search: String,
    sort: Option<SortState>,
    page: usize,
    page_size: usize,
}

impl TableView {
    /// Build a view from the component contract.
    ///
    /// Column keys that resolve on no row are reported once here; the cells
    /// degrade to empty text rather than failing later.
    pub fn new(spec: TableSpec) -> Self {
        if !spec.data.is_empty() {
            for column in &spec.columns {
                let resolves_somewhere = spec
                    .data
                    .iter()
                    .any(|row| column.raw_value(row).is_some());
                if !resolves_somewhere {
                    warn!(
                        "table column '{}' does not resolve on any row; cells will render empty",
                        column.key
                    );
                }
            }
        }

        let page_size = spec.page_size;
        Self {
            spec,
            search: String::new(),
            sort: None,
            page: 1,
            page_size,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.spec.columns
    }

    /// Replace the backing rows (e.g. after a refetch), keeping the current
    /// search and sort but returning to the first page.
    pub fn set_rows(&mut self, rows: Vec<Value>) {
        self.spec.data = rows;
        self.page = 1;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.spec.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.spec.loading
    }

    /// The placeholder to render instead of a body, when there is one.
    ///
    /// Present exactly when the *source* collection is empty; a search that
    /// matches nothing still renders an (empty) table.
    pub fn placeholder(&self) -> Option<&'static str> {
        self.spec.data.is_empty().then_some(NO_DATA_PLACEHOLDER)
    }

    // ---- search ----

    /// Set the search term. Matching is a case-insensitive substring test
    /// against every property of each row. The empty term is the identity.
    /// A new term returns the view to page 1.
    pub fn set_search(&mut self, term: &str) {
        if self.search == term {
            return;
        }
        self.search = term.to_string();
        self.page = 1;
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    // ---- sort ----

    /// Toggle sorting on `key`.
    ///
    /// Repeated calls on the active key flip the direction; switching to a
    /// different key starts ascending. Keys whose descriptor is not
    /// `sortable` (or that name no column) are ignored.
    pub fn toggle_sort(&mut self, key: &str) {
        let sortable = self
            .spec
            .columns
            .iter()
            .any(|column| column.key.as_str() == key && column.sortable);
        if !sortable {
            return;
        }

        self.sort = Some(match self.sort {
            Some(active) if active.key.as_str() == key => SortState {
                key: active.key,
                direction: active.direction.toggled(),
            },
            _ => SortState::ascending(key.into()),
        });

        if let Some(on_sort) = &self.spec.on_sort {
            on_sort(self.sort);
        }
    }

    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    // ---- pagination ----

    /// Jump to a 1-based page with the given page size.
    ///
    /// The engine does not clamp; asking for a page past the end simply
    /// yields no visible rows.
    pub fn set_page(&mut self, page: usize, page_size: usize) {
        self.page = page;
        self.page_size = page_size;

        if let Some(on_change) = &self.spec.on_pagination_change {
            on_change(self.page, self.page_size);
        }
    }

    /// Current pagination state; `total` is the post-search row count.
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            page_size: self.page_size,
            total: self.current_view().len(),
        }
    }

    // ---- view computation ----

    /// The filtered and sorted collection, before paging.
    ///
    /// With no search and no sort this is the source collection in insertion
    /// order.
    pub fn current_view(&self) -> Vec<&Value> {
        let mut view: Vec<&Value> = if self.search.is_empty() {
            self.spec.data.iter().collect()
        } else {
            let term = self.search.to_lowercase();
            self.spec
                .data
                .iter()
                .filter(|row| matches_search(row, &term))
                .collect()
        };

        if let Some(sort) = &self.sort {
            let key = sort.key.as_str();
            // Stable sort: rows comparing equal keep their insertion order.
            view.sort_by(|a, b| {
                compare_values(
                    crate::record::resolve_path(a, key),
                    crate::record::resolve_path(b, key),
                    sort.direction,
                )
            });
        }

        view
    }

    /// The rows for the current page.
    pub fn visible_rows(&self) -> Vec<&Value> {
        let view = self.current_view();
        page_slice(&view, self.page, self.page_size).to_vec()
    }

    /// Display text for one visible cell.
    pub fn cell_text(&self, column: &Column, row: &Value, index: usize) -> String {
        column.cell_text(row, index)
    }

    // ---- export ----

    /// CSV of the full current view (filtered + sorted, all pages).
    pub fn export_csv(&self) -> String {
        write_csv(&self.spec.columns, &self.current_view())
    }

    /// The download name for an export: `<export_file_name>.csv`.
    pub fn export_file_name(&self) -> String {
        format!("{}.csv", self.spec.export_file_name)
    }
}

impl std::fmt::Debug for TableView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableView")
            .field("spec", &self.spec)
            .field("search", &self.search)
            .field("sort", &self.sort)
            .field("page", &self.page)
            .field("page_size", &self.page_size)
            .finish()
    }
}
