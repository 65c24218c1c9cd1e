//! Generic data table engine for the TravelDesk dashboards.
//!
//! Every screen in the application renders tabular data through the same
//! primitives: a set of [`Column`] descriptors, an opaque row collection, and
//! a [`TableView`] that computes the currently visible subset (searched,
//! sorted, paginated) plus a CSV export of the full current view.
//!
//! The engine performs no I/O and knows nothing about widgets; dashboards
//! construct a [`TableSpec`] and drive the view in response to user input.

mod column;
mod contract;
mod export;
mod pagination;
mod record;
mod sort;
mod view;

pub use column::{Align, Column, RenderFn};
pub use contract::{PaginationCallback, SortCallback, TableSpec};
pub use export::write_csv;
pub use pagination::{Pagination, page_slice};
pub use record::{coerce_str, resolve_path, rows_from};
pub use sort::{SortDirection, SortState};
pub use view::TableView;

/// Text shown in place of the table body when the row collection is empty.
///
/// Dashboards render this verbatim; keeping it here means every screen shows
/// the same placeholder.
pub const NO_DATA_PLACEHOLDER: &str = "No data available";
