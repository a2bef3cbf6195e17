//! Property-based tests for the grid engine.
//!
//! Run with: `cargo test -p backoffice-core --test grid_properties`

use backoffice_core::grid::{ColumnDescriptor, GridEngine, GridOptions, SortDirection, ValueKind};
use backoffice_core::{Record, RecordId};
use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;

const PAGE_SIZES: [usize; 4] = [10, 25, 50, 100];

fn build_records(rows: &[(String, i64)]) -> Vec<Record> {
    rows.iter()
        .enumerate()
        .map(|(i, (name, score))| {
            Record::from_value(json!({"id": i + 1, "name": name, "score": score}))
                .expect("object")
        })
        .collect()
}

fn columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("name", "Name").with_filterable(true),
        ColumnDescriptor::new("score", "Score").with_kind(ValueKind::Number),
    ]
}

fn build_grid(rows: &[(String, i64)], page_size: usize) -> GridEngine {
    let options = GridOptions::default()
        .selectable()
        .with_initial_page_size(page_size);
    GridEngine::new(build_records(rows), columns(), options).expect("grid")
}

fn rows_strategy() -> impl Strategy<Value = Vec<(String, i64)>> {
    proptest::collection::vec(("[a-cA-C]{0,4}", -5i64..5), 0usize..=240)
}

fn page_size_strategy() -> impl Strategy<Value = usize> {
    proptest::sample::select(PAGE_SIZES.to_vec())
}

fn visible_ids(grid: &GridEngine) -> Vec<RecordId> {
    grid.visible_slice().iter().map(|row| row.id.clone()).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Walking every page visits each matching record exactly once.
    #[test]
    fn prop_pages_partition_the_search_result(
        rows in rows_strategy(),
        page_size in page_size_strategy(),
        needle in "[abc]{0,2}",
    ) {
        let mut grid = build_grid(&rows, page_size);
        grid.set_search_text(needle.clone());

        let expected: HashSet<RecordId> = rows
            .iter()
            .enumerate()
            .filter(|(_, (name, score))| {
                name.to_lowercase().contains(&needle) || score.to_string().contains(&needle)
            })
            .map(|(i, _)| RecordId::from((i + 1) as u64))
            .collect();
        prop_assert_eq!(grid.total(), expected.len());

        let mut seen = Vec::new();
        for page in 1..=grid.page_count() {
            grid.set_page(page);
            let slice = visible_ids(&grid);
            prop_assert!(slice.len() <= page_size);
            seen.extend(slice);
        }

        let unique: HashSet<RecordId> = seen.iter().cloned().collect();
        prop_assert_eq!(unique.len(), seen.len());
        prop_assert_eq!(unique, expected);
    }

    /// The page count is `ceil(total / page_size)`, never below one.
    #[test]
    fn prop_page_count_formula(
        rows in rows_strategy(),
        page_size in page_size_strategy(),
    ) {
        let grid = build_grid(&rows, page_size);
        let expected = rows.len().div_ceil(page_size).max(1);
        prop_assert_eq!(grid.page_count(), expected);
    }

    /// Sorting never reorders records with equal keys.
    #[test]
    fn prop_sort_is_stable(rows in rows_strategy()) {
        let mut grid = build_grid(&rows, 100);
        grid.set_sort("score", SortDirection::Ascending).expect("sort");

        let ordered: Vec<(i64, u64)> = grid
            .filtered()
            .map(|r| {
                let score = r.get("score").and_then(serde_json::Value::as_i64).expect("score");
                let id = r.get("id").and_then(serde_json::Value::as_u64).expect("id");
                (score, id)
            })
            .collect();

        for pair in ordered.windows(2) {
            prop_assert!(pair[0].0 <= pair[1].0);
            if pair[0].0 == pair[1].0 {
                prop_assert!(pair[0].1 < pair[1].1);
            }
        }
    }

    /// Descending order is ascending order reversed when keys are distinct.
    #[test]
    fn prop_descending_reverses_ascending(
        scores in proptest::collection::hash_set(-1000i64..1000, 0usize..=60),
    ) {
        let rows: Vec<(String, i64)> = scores.into_iter().map(|s| (String::new(), s)).collect();
        let mut grid = build_grid(&rows, 100);

        grid.set_sort("score", SortDirection::Ascending).expect("sort");
        let ascending: Vec<Record> = grid.filtered().cloned().collect();
        grid.set_sort("score", SortDirection::Descending).expect("sort");
        let mut descending: Vec<Record> = grid.filtered().cloned().collect();
        descending.reverse();

        prop_assert_eq!(ascending, descending);
    }

    /// Select-all picks every matching record whatever the page size.
    #[test]
    fn prop_select_all_ignores_page_size(
        rows in rows_strategy(),
        page_size in page_size_strategy(),
        needle in "[abc]{0,1}",
    ) {
        let mut grid = build_grid(&rows, page_size);
        grid.set_search_text(needle);
        let total = grid.total();

        grid.select_all();

        prop_assert_eq!(grid.selected_ids().len(), total);
    }

    /// Going to page one twice changes nothing the second time.
    #[test]
    fn prop_set_page_one_is_idempotent(
        rows in rows_strategy(),
        page in 0usize..30,
    ) {
        let mut grid = build_grid(&rows, 10);
        grid.set_page(page);

        grid.set_page(1);
        let first = visible_ids(&grid);
        grid.set_page(1);

        prop_assert_eq!(grid.current_page(), 1);
        prop_assert_eq!(visible_ids(&grid), first);
    }

    /// The current page always stays within `[1, page_count]`.
    #[test]
    fn prop_current_page_in_range(
        rows in rows_strategy(),
        page in 0usize..50,
        needle in "[abc]{0,3}",
    ) {
        let mut grid = build_grid(&rows, 10);
        grid.set_page(page);
        grid.set_search_text(needle);

        prop_assert!(grid.current_page() >= 1);
        prop_assert!(grid.current_page() <= grid.page_count());
    }
}
