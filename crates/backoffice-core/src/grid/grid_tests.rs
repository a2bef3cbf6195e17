//! Tests for the grid engine

use super::*;
use serde_json::{json, Value};
use std::cmp::Ordering;

fn record(value: Value) -> Record {
    Record::from_value(value).expect("object")
}

fn products(n: u64) -> Vec<Record> {
    (1..=n)
        .map(|i| {
            record(json!({
                "id": i,
                "name": format!("Product {i:03}"),
                "price": (i * 7) % 50,
                "status": if i % 2 == 0 { "active" } else { "draft" },
            }))
        })
        .collect()
}

fn product_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("id", "#").with_kind(ValueKind::Number),
        ColumnDescriptor::new("name", "Name").with_filterable(true),
        ColumnDescriptor::new("price", "Price").with_kind(ValueKind::Number),
        ColumnDescriptor::new("status", "Status")
            .with_filterable(true)
            .with_sortable(false),
    ]
}

fn grid(n: u64) -> GridEngine {
    GridEngine::new(products(n), product_columns(), GridOptions::default().selectable())
        .expect("grid")
}

fn visible_ids(grid: &GridEngine) -> Vec<String> {
    grid.visible_slice()
        .iter()
        .map(|row| row.id.to_string())
        .collect()
}

// =========================================================================
// Construction
// =========================================================================

#[test]
fn test_new_grid_starts_on_first_page() {
    // Arrange & Act
    let grid = grid(30);

    // Assert
    assert_eq!(grid.total(), 30);
    assert_eq!(grid.current_page(), 1);
    assert_eq!(grid.page_size(), 10);
    assert_eq!(grid.page_count(), 3);
    assert_eq!(grid.range(), Some((1, 10)));
}

#[test]
fn test_empty_grid_has_one_page_and_no_range() {
    let grid = GridEngine::new(Vec::new(), product_columns(), GridOptions::default())
        .expect("grid");

    assert_eq!(grid.total(), 0);
    assert_eq!(grid.page_count(), 1);
    assert!(grid.visible_slice().is_empty());
    assert_eq!(grid.range(), None);
}

#[test]
fn test_duplicate_ids_are_rejected() {
    // Arrange
    let records = vec![record(json!({"id": 1})), record(json!({"id": "1"}))];

    // Act
    let result = GridEngine::new(records, product_columns(), GridOptions::default());

    // Assert
    assert!(matches!(result, Err(Error::DuplicateId(ref id)) if id == "1"));
}

#[test]
fn test_records_without_id_are_rejected() {
    let records = vec![record(json!({"id": 1})), record(json!({"name": "orphan"}))];

    let result = GridEngine::new(records, product_columns(), GridOptions::default());

    assert!(matches!(result, Err(Error::MissingId(1))));
}

#[test]
fn test_key_field_identifies_records() {
    let records = vec![record(json!({"key": "a"})), record(json!({"key": "b"}))];

    let grid = GridEngine::new(records, Vec::new(), GridOptions::default()).expect("grid");

    assert_eq!(visible_ids(&grid), vec!["a", "b"]);
}

#[test]
fn test_initial_page_size_must_be_an_option() {
    let options = GridOptions::default().with_initial_page_size(7);

    let result = GridEngine::new(products(3), product_columns(), options);

    assert!(matches!(result, Err(Error::InvalidPageSize { size: 7, .. })));
}

#[test]
fn test_zero_page_size_option_is_rejected() {
    let options = GridOptions::default().with_page_sizes(vec![10, 0]);

    let result = GridEngine::new(products(3), product_columns(), options);

    assert!(matches!(result, Err(Error::InvalidPageSize { size: 0, .. })));
}

#[test]
fn test_empty_page_size_options_are_rejected() {
    let options = GridOptions::default().with_page_sizes(Vec::new());

    let result = GridEngine::new(products(3), product_columns(), options);

    assert!(matches!(result, Err(Error::InvalidPageSize { .. })));
}

// =========================================================================
// Search and filters
// =========================================================================

#[test]
fn test_search_is_case_insensitive_substring() {
    // Arrange
    let mut grid = grid(30);

    // Act
    grid.set_search_text("PRODUCT 01");

    // Assert
    assert_eq!(grid.total(), 10);
    assert!(grid
        .filtered()
        .all(|r| r.get("name").and_then(Value::as_str).is_some_and(|n| n.starts_with("Product 01"))));
}

#[test]
fn test_search_matches_numbers_by_their_text() {
    let mut grid = grid(30);

    grid.set_search_text("25");

    // id 25 plus any price of 25.
    assert!(grid.filtered().any(|r| r.get("id") == Some(&json!(25))));
}

#[test]
fn test_search_resets_to_page_one() {
    // Arrange
    let mut grid = grid(125);
    grid.set_page(4);

    // Act
    grid.set_search_text("Product 00");

    // Assert
    assert_eq!(grid.current_page(), 1);
    assert_eq!(grid.total(), 9);
    assert_eq!(grid.visible_slice().len(), 9);
}

#[test]
fn test_search_three_matches_on_page_three() {
    // Arrange
    let records = (1..=60)
        .map(|i| {
            let name = if i % 20 == 0 { "Needle".to_string() } else { format!("hay {i}") };
            record(json!({"id": i, "name": name}))
        })
        .collect();
    let mut grid = GridEngine::new(
        records,
        vec![ColumnDescriptor::new("name", "Name")],
        GridOptions::default(),
    )
    .expect("grid");
    grid.set_page(3);

    // Act
    grid.set_search_text("needle");

    // Assert
    assert_eq!(grid.current_page(), 1);
    assert_eq!(grid.visible_slice().len(), 3);
}

#[test]
fn test_search_skips_null_and_missing_values() {
    let records = vec![
        record(json!({"id": 1, "name": null})),
        record(json!({"id": 2})),
        record(json!({"id": 3, "name": "null"})),
    ];
    let mut grid = GridEngine::new(
        records,
        vec![ColumnDescriptor::new("name", "Name")],
        GridOptions::default(),
    )
    .expect("grid");

    grid.set_search_text("null");

    assert_eq!(visible_ids(&grid), vec!["3"]);
}

#[test]
fn test_search_only_looks_at_declared_columns() {
    let records = vec![record(json!({"id": 1, "name": "a", "secret": "findme"}))];
    let mut grid = GridEngine::new(
        records,
        vec![ColumnDescriptor::new("name", "Name")],
        GridOptions::default(),
    )
    .expect("grid");

    grid.set_search_text("findme");

    assert_eq!(grid.total(), 0);
}

#[test]
fn test_search_ignored_when_not_searchable() {
    let mut options = GridOptions::default();
    options.searchable = false;
    let mut grid = GridEngine::new(products(5), product_columns(), options).expect("grid");

    grid.set_search_text("zzz");

    assert_eq!(grid.total(), 5);
    assert!(grid.state().search_text.is_empty());
}

#[test]
fn test_column_filter_combines_with_search() {
    // Arrange
    let mut grid = grid(30);

    // Act
    grid.set_column_filter("status", "active").expect("filter");
    grid.set_search_text("product 00");

    // Assert: ids 2,4,6,8
    assert_eq!(visible_ids(&grid), vec!["2", "4", "6", "8"]);
}

#[test]
fn test_empty_column_filter_clears_it() {
    let mut grid = grid(10);
    grid.set_column_filter("status", "draft").expect("filter");
    assert_eq!(grid.total(), 5);

    grid.set_column_filter("status", "").expect("filter");

    assert_eq!(grid.total(), 10);
    assert!(grid.state().column_filters.is_empty());
}

#[test]
fn test_column_filter_on_unknown_or_unfilterable_column() {
    let mut grid = grid(10);

    assert!(matches!(
        grid.set_column_filter("nope", "x"),
        Err(Error::UnknownColumn { ref field, .. }) if field == "nope"
    ));
    assert!(matches!(
        grid.set_column_filter("price", "1"),
        Err(Error::UnknownColumn { .. })
    ));
}

#[test]
fn test_clear_filters_restores_everything() {
    let mut grid = grid(20);
    grid.set_search_text("product 01");
    grid.set_column_filter("status", "active").expect("filter");

    grid.clear_filters();

    assert_eq!(grid.total(), 20);
}

// =========================================================================
// Sorting
// =========================================================================

#[test]
fn test_sort_numbers_numerically() {
    // Arrange
    let records = vec![
        record(json!({"id": 1, "qty": 10})),
        record(json!({"id": 2, "qty": 9})),
        record(json!({"id": 3, "qty": 100})),
    ];
    let columns = vec![ColumnDescriptor::new("qty", "Qty").with_kind(ValueKind::Number)];
    let mut grid = GridEngine::new(records, columns, GridOptions::default()).expect("grid");

    // Act
    grid.set_sort("qty", SortDirection::Ascending).expect("sort");

    // Assert
    assert_eq!(visible_ids(&grid), vec!["2", "1", "3"]);
}

#[test]
fn test_sort_descending_reverses_and_none_restores_source_order() {
    let mut grid = grid(5);

    grid.set_sort("id", SortDirection::Descending).expect("sort");
    assert_eq!(visible_ids(&grid), vec!["5", "4", "3", "2", "1"]);

    grid.set_sort("id", SortDirection::None).expect("sort");
    assert_eq!(visible_ids(&grid), vec!["1", "2", "3", "4", "5"]);
    assert_eq!(grid.state().sort_key, None);
}

#[test]
fn test_sort_missing_values_lead_ascending() {
    let records = vec![
        record(json!({"id": 1, "name": "b"})),
        record(json!({"id": 2})),
        record(json!({"id": 3, "name": "a"})),
        record(json!({"id": 4, "name": null})),
    ];
    let mut grid = GridEngine::new(
        records,
        vec![ColumnDescriptor::new("name", "Name")],
        GridOptions::default(),
    )
    .expect("grid");

    grid.set_sort("name", SortDirection::Ascending).expect("sort");

    assert_eq!(visible_ids(&grid), vec!["2", "4", "3", "1"]);
}

#[test]
fn test_sort_is_stable_for_ties() {
    // Arrange
    let records = vec![
        record(json!({"id": "a", "group": "x"})),
        record(json!({"id": "b", "group": "y"})),
        record(json!({"id": "c", "group": "x"})),
        record(json!({"id": "d", "group": "x"})),
    ];
    let mut grid = GridEngine::new(
        records,
        vec![ColumnDescriptor::new("group", "Group")],
        GridOptions::default(),
    )
    .expect("grid");

    // Act
    grid.set_sort("group", SortDirection::Ascending).expect("sort");

    // Assert
    assert_eq!(visible_ids(&grid), vec!["a", "c", "d", "b"]);
}

#[test]
fn test_sort_dates_chronologically() {
    let records = vec![
        record(json!({"id": 1, "created_at": "2024-03-01T10:00:00Z"})),
        record(json!({"id": 2, "created_at": "2023-12-31"})),
        record(json!({"id": 3, "created_at": "2024-01-15T08:30:00.000Z"})),
    ];
    let columns = vec![ColumnDescriptor::new("created_at", "Created").with_kind(ValueKind::Date)];
    let mut grid = GridEngine::new(records, columns, GridOptions::default()).expect("grid");

    grid.set_sort("created_at", SortDirection::Ascending).expect("sort");

    assert_eq!(visible_ids(&grid), vec!["2", "3", "1"]);
}

#[test]
fn test_sort_keeps_page_when_in_range() {
    let mut grid = grid(30);
    grid.set_page(2);

    grid.set_sort("name", SortDirection::Descending).expect("sort");

    assert_eq!(grid.current_page(), 2);
}

#[test]
fn test_sort_rejects_unsortable_column() {
    let mut grid = grid(3);

    let result = grid.set_sort("status", SortDirection::Ascending);

    assert!(matches!(result, Err(Error::UnknownColumn { .. })));
    assert_eq!(grid.state().sort_key, None);
}

#[test]
fn test_compare_text_orders_case_insensitively() {
    assert_eq!(compare_text("apple", "Banana"), Ordering::Less);
    assert_eq!(compare_text("apple", "Apple"), Ordering::Less);
    assert_eq!(compare_text("Zebra", "zebra"), Ordering::Greater);
    assert_eq!(compare_text("same", "same"), Ordering::Equal);
}

#[test]
fn test_compare_text_orders_accents_by_code_point() {
    assert_eq!(compare_text("zebra", "éclair"), Ordering::Less);
    assert_eq!(compare_text("Éclair", "éclair"), Ordering::Greater);
}

#[test]
fn test_compare_values_number_accepts_numeric_strings() {
    let a = json!("10");
    let b = json!(9);
    assert_eq!(
        compare_values(ValueKind::Number, Some(&a), Some(&b)),
        Ordering::Greater
    );
    assert_eq!(
        compare_values(ValueKind::Number, Some(&json!("n/a")), Some(&b)),
        Ordering::Less
    );
}

// =========================================================================
// Pagination
// =========================================================================

#[test]
fn test_125_records_page_size_25_has_five_pages() {
    // Arrange
    let mut grid = grid(125);

    // Act
    grid.set_page_size(25).expect("page size");
    grid.set_page(5);

    // Assert
    assert_eq!(grid.page_count(), 5);
    assert_eq!(grid.visible_slice().len(), 25);
    assert_eq!(grid.range(), Some((101, 125)));
}

#[test]
fn test_set_page_clamps() {
    let mut grid = grid(30);

    grid.set_page(99);
    assert_eq!(grid.current_page(), 3);

    grid.set_page(0);
    assert_eq!(grid.current_page(), 1);
}

#[test]
fn test_display_index_continues_across_pages() {
    let mut grid = grid(30);

    grid.set_page(2);

    let indices: Vec<usize> = grid.visible_slice().iter().map(|r| r.display_index).collect();
    assert_eq!(indices, (11..=20).collect::<Vec<_>>());
}

#[test]
fn test_last_page_is_partial() {
    let mut grid = grid(23);

    grid.set_page(3);

    assert_eq!(visible_ids(&grid), vec!["21", "22", "23"]);
    assert_eq!(grid.range(), Some((21, 23)));
}

#[test]
fn test_page_size_change_keeps_first_visible_record() {
    // Arrange
    let mut grid = grid(100);
    grid.set_page(4); // records 31..=40

    // Act
    grid.set_page_size(25).expect("page size");

    // Assert: record 31 lives on page 2 of 25
    assert_eq!(grid.current_page(), 2);
    assert!(visible_ids(&grid).contains(&"31".to_string()));
}

#[test]
fn test_page_size_must_be_an_option() {
    let mut grid = grid(10);

    let result = grid.set_page_size(7);

    assert!(matches!(
        result,
        Err(Error::InvalidPageSize { size: 7, ref allowed }) if allowed == &vec![10, 25, 50, 100]
    ));
    assert_eq!(grid.page_size(), 10);
}

#[test]
fn test_refresh_returns_to_first_page() {
    let mut grid = grid(30);
    grid.set_page(3);

    grid.refresh();

    assert_eq!(grid.current_page(), 1);
    assert_eq!(grid.total(), 30);
}

// =========================================================================
// Selection
// =========================================================================

#[test]
fn test_toggle_select_adds_and_removes() {
    let mut grid = grid(5);
    let id = RecordId::from(3u64);

    assert!(grid.toggle_select(&id));
    assert!(grid.is_selected(&id));
    assert!(!grid.toggle_select(&id));
    assert!(grid.selected_ids().is_empty());
}

#[test]
fn test_toggle_unknown_id_is_ignored() {
    let mut grid = grid(5);

    assert!(!grid.toggle_select(&RecordId::from("999")));
    assert!(grid.selected_ids().is_empty());
}

#[test]
fn test_selection_disabled_when_not_selectable() {
    let mut grid = GridEngine::new(products(5), product_columns(), GridOptions::default())
        .expect("grid");

    grid.toggle_select(&RecordId::from(1u64));
    grid.select_all();

    assert!(grid.selected_ids().is_empty());
}

#[test]
fn test_select_all_covers_every_page_of_the_filtered_view() {
    // Arrange
    let mut grid = grid(125);
    grid.set_column_filter("status", "active").expect("filter");

    // Act
    grid.select_all();

    // Assert
    assert_eq!(grid.selected_ids().len(), 62);
    assert_eq!(grid.page_count(), 7);
}

#[test]
fn test_select_page_adds_only_visible_rows() {
    let mut grid = grid(30);
    grid.toggle_select(&RecordId::from(25u64));
    grid.set_page(2);

    grid.select_page();

    let selected = grid.selected_ids();
    assert_eq!(selected.len(), 11);
    assert_eq!(selected[0], RecordId::from(25u64));
}

#[test]
fn test_selection_survives_paging_and_filtering() {
    let mut grid = grid(30);
    grid.toggle_select(&RecordId::from(1u64));

    grid.set_page(3);
    grid.set_search_text("product 02");

    assert!(grid.is_selected(&RecordId::from(1u64)));
}

#[test]
fn test_clear_selection() {
    let mut grid = grid(30);
    grid.select_all();

    grid.clear_selection();

    assert!(grid.selected_ids().is_empty());
}

// =========================================================================
// Source changes
// =========================================================================

#[test]
fn test_set_records_prunes_selection_and_clamps_page() {
    // Arrange
    let mut grid = grid(30);
    grid.toggle_select(&RecordId::from(2u64));
    grid.toggle_select(&RecordId::from(28u64));
    grid.set_page(3);

    // Act
    grid.set_records(products(12)).expect("records");

    // Assert
    assert_eq!(grid.selected_ids(), vec![RecordId::from(2u64)]);
    assert_eq!(grid.current_page(), 1);
    assert_eq!(grid.total(), 12);
}

#[test]
fn test_set_records_rejects_duplicates_and_keeps_state() {
    let mut grid = grid(3);

    let result = grid.set_records(vec![record(json!({"id": 1})), record(json!({"id": 1}))]);

    assert!(result.is_err());
    assert_eq!(grid.total(), 3);
}

#[test]
fn test_set_columns_drops_stale_sort_and_filters() {
    let mut grid = grid(10);
    grid.set_sort("price", SortDirection::Ascending).expect("sort");
    grid.set_column_filter("status", "active").expect("filter");

    grid.set_columns(vec![ColumnDescriptor::new("name", "Name")]);

    assert_eq!(grid.state().sort_key, None);
    assert!(grid.state().column_filters.is_empty());
    assert_eq!(grid.total(), 10);
}

// =========================================================================
// Cells and events
// =========================================================================

#[test]
fn test_cells_use_render_functions() {
    // Arrange
    let columns = vec![
        ColumnDescriptor::new("name", "Name"),
        ColumnDescriptor::new("price", "Price")
            .with_render(|value, _| format!("${}", value.as_f64().unwrap_or_default())),
        ColumnDescriptor::new("missing", "Missing"),
    ];
    let grid = GridEngine::new(
        vec![record(json!({"id": 1, "name": "Mug", "price": 12.5}))],
        columns,
        GridOptions::default(),
    )
    .expect("grid");

    // Act
    let row = grid.visible_slice()[0];
    let cells = grid.cells(row.record);

    // Assert
    assert_eq!(cells, vec!["Mug", "$12.5", ""]);
}

#[test]
fn test_render_does_not_affect_search_or_sort() {
    let columns = vec![ColumnDescriptor::new("status", "Status")
        .with_render(|_, _| "HIDDEN".to_string())];
    let mut grid = GridEngine::new(
        vec![record(json!({"id": 1, "status": "paid"}))],
        columns,
        GridOptions::default(),
    )
    .expect("grid");

    grid.set_search_text("hidden");
    assert_eq!(grid.total(), 0);

    grid.set_search_text("paid");
    assert_eq!(grid.total(), 1);
}

#[test]
fn test_subscribers_receive_selection_and_page_events() {
    // Arrange
    let mut grid = grid(30);
    let events = grid.subscribe();

    // Act
    grid.toggle_select(&RecordId::from(4u64));
    grid.set_page(2);

    // Assert
    let received: Vec<GridEvent> = events.try_iter().collect();
    assert_eq!(
        received,
        vec![
            GridEvent::SelectionChanged {
                selected: vec![RecordId::from(4u64)]
            },
            GridEvent::PageChanged {
                current: 2,
                page_size: 10
            },
        ]
    );
}

#[test]
fn test_search_publishes_view_change() {
    let mut grid = grid(30);
    let events = grid.subscribe();

    grid.set_search_text("product 00");

    let received: Vec<GridEvent> = events.try_iter().collect();
    assert_eq!(
        received,
        vec![GridEvent::ViewChanged {
            total: 9,
            page_count: 1
        }]
    );
}

#[test]
fn test_dropped_subscriber_is_pruned() {
    let mut grid = grid(3);
    drop(grid.subscribe());
    assert_eq!(grid.subscriber_count(), 1);

    grid.refresh();

    assert_eq!(grid.subscriber_count(), 0);
}

#[test]
fn test_infer_columns_puts_id_first() {
    let records = vec![record(json!({"full_name": "Ann", "id": 1, "tags": ["a"], "created_at": "2024-01-01"}))];

    let columns = infer_columns(&records);

    let fields: Vec<&str> = columns.iter().map(|c| c.field.as_str()).collect();
    assert_eq!(fields, vec!["id", "full_name", "created_at"]);
    assert_eq!(columns[1].header, "Full Name");
    assert_eq!(columns[0].kind, ValueKind::Number);
    assert_eq!(columns[2].kind, ValueKind::Date);
}
