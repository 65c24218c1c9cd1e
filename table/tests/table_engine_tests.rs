//! Engine-level tests for the ordering, filtering, and paging invariants the
//! dashboards rely on.

use serde_json::{Value, json};
use traveldesk_table::{Column, SortDirection, TableSpec, TableView, rows_from};

fn view_with(data: Vec<Value>, page_size: usize) -> TableView {
    let _ = env_logger::builder().is_test(true).try_init();
    let columns = vec![
        Column::builder().key("v").title("Value").sortable(true).build(),
        Column::builder().key("name").title("Name").sortable(true).build(),
    ];
    TableView::new(
        TableSpec::builder()
            .columns(columns)
            .data(data)
            .page_size(page_size)
            .build(),
    )
}

fn values(view: &TableView) -> Vec<Value> {
    view.current_view()
        .iter()
        .map(|row| row.get("v").cloned().unwrap_or(Value::Null))
        .collect()
}

#[test]
fn sorting_twice_toggles_back_to_descending_start() {
    let mut view = view_with(
        vec![json!({"v": "b"}), json!({"v": "a"}), json!({"v": "c"})],
        10,
    );

    view.toggle_sort("v");
    assert_eq!(
        view.sort().expect("sort active").direction,
        SortDirection::Asc
    );
    let ascending = values(&view);

    view.toggle_sort("v");
    assert_eq!(
        view.sort().expect("sort active").direction,
        SortDirection::Desc
    );
    let descending = values(&view);

    let mut reversed = descending.clone();
    reversed.reverse();
    assert_eq!(ascending, reversed);

    // Toggling again restores the original ascending order.
    view.toggle_sort("v");
    assert_eq!(values(&view), ascending);
}

#[test]
fn switching_sort_key_resets_to_ascending() {
    let mut view = view_with(
        vec![
            json!({"v": "b", "name": "z"}),
            json!({"v": "a", "name": "y"}),
        ],
        10,
    );

    view.toggle_sort("v");
    view.toggle_sort("v");
    assert_eq!(
        view.sort().expect("sort active").direction,
        SortDirection::Desc
    );

    view.toggle_sort("name");
    let sort = view.sort().expect("sort active");
    assert_eq!(sort.key.as_str(), "name");
    assert_eq!(sort.direction, SortDirection::Asc);
}

#[test]
fn nulls_sort_last_even_descending() {
    let mut view = view_with(
        vec![json!({"v": 1}), json!({"v": null}), json!({"v": 2})],
        10,
    );

    view.toggle_sort("v");
    view.toggle_sort("v"); // descending

    assert_eq!(values(&view), vec![json!(2), json!(1), Value::Null]);
}

#[test]
fn missing_values_sort_like_nulls() {
    let mut view = view_with(vec![json!({}), json!({"v": "x"})], 10);

    view.toggle_sort("v");
    assert_eq!(values(&view), vec![json!("x"), Value::Null]);
}

#[test]
fn empty_search_is_identity() {
    let data = vec![json!({"v": 3}), json!({"v": 1}), json!({"v": 2})];
    let mut view = view_with(data.clone(), 10);

    view.set_search("");
    let current: Vec<Value> = view.current_view().into_iter().cloned().collect();

    assert_eq!(current.len(), data.len());
    assert_eq!(current, data);
}

#[test]
fn pagination_is_exact_slicing() {
    let data: Vec<Value> = (0..7).map(|i| json!({"v": i})).collect();
    let mut view = view_with(data.clone(), 3);

    for (page, expected) in [(1, 0..3), (2, 3..6), (3, 6..7)] {
        view.set_page(page, 3);
        let visible: Vec<Value> = view.visible_rows().into_iter().cloned().collect();

        assert!(visible.len() <= 3);
        assert_eq!(visible, data[expected].to_vec());
    }
}

#[test]
fn export_covers_all_pages_of_the_filtered_view() {
    let data: Vec<Value> = (0..5)
        .map(|i| json!({"v": i, "name": format!("row{i}")}))
        .collect();
    let mut view = view_with(data, 2);
    view.set_page(1, 2);

    let csv = view.export_csv();
    let lines: Vec<&str> = csv.lines().collect();

    // Header plus every row, not just the two visible ones.
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "v,name");
    assert_eq!(lines[1], "0,row0");
    assert_eq!(lines[5], "4,row4");
}

#[test]
fn export_file_name_gets_csv_suffix() {
    let view = TableView::new(
        TableSpec::builder()
            .columns(vec![Column::builder().key("v").title("V").build()])
            .data(vec![])
            .export_file_name("travel-requests")
            .build(),
    );

    assert_eq!(view.export_file_name(), "travel-requests.csv");
}

#[test]
fn typed_records_convert_and_resolve() {
    #[derive(serde::Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Row {
        id: i64,
        employee_name: String,
    }

    let rows = rows_from(&[
        Row {
            id: 1,
            employee_name: "Noor".to_string(),
        },
        Row {
            id: 2,
            employee_name: "Sam".to_string(),
        },
    ]);

    let mut view = TableView::new(
        TableSpec::builder()
            .columns(vec![
                Column::builder()
                    .key("employeeName")
                    .title("Employee")
                    .sortable(true)
                    .build(),
            ])
            .data(rows)
            .build(),
    );

    view.toggle_sort("employeeName");
    let names: Vec<Value> = view
        .current_view()
        .iter()
        .map(|row| row["employeeName"].clone())
        .collect();
    assert_eq!(names, vec![json!("Noor"), json!("Sam")]);
}

#[test]
fn search_filters_before_sort_and_pagination() {
    let data = vec![
        json!({"v": "delta", "name": "keep"}),
        json!({"v": "alpha", "name": "keep"}),
        json!({"v": "echo", "name": "drop"}),
        json!({"v": "bravo", "name": "keep"}),
    ];
    let mut view = view_with(data, 2);

    view.set_search("keep");
    view.toggle_sort("v");
    view.set_page(2, 2);

    let visible: Vec<Value> = view
        .visible_rows()
        .iter()
        .map(|row| row["v"].clone())
        .collect();

    // Filtered to three rows, sorted ascending, second page holds the last.
    assert_eq!(visible, vec![json!("delta")]);
    assert_eq!(view.pagination().total, 3);
}
