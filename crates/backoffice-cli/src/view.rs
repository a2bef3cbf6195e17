//! Builds a grid view from command-line list options.

use anyhow::{anyhow, Context};
use backoffice_core::grid::infer_columns;
use backoffice_core::{GridConfig, GridEngine, GridEvent, GridOptions, Record, SortDirection};

/// Search, filter, sort and paging choices for one `list` call.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Free-text search across every column.
    pub search: Option<String>,
    /// `field=value` column filters.
    pub filters: Vec<String>,
    /// `field` or `field:desc`.
    pub sort: Option<String>,
    /// 1-based page; clamped by the grid.
    pub page: Option<usize>,
    /// Rows per page; must be one of the configured sizes.
    pub page_size: Option<usize>,
}

/// Splits `field=value`. The value may itself contain `=`.
pub fn parse_filter(raw: &str) -> anyhow::Result<(String, String)> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("filter '{raw}' must look like field=value"))?;
    if field.trim().is_empty() {
        anyhow::bail!("filter '{raw}' has an empty field name");
    }
    Ok((field.trim().to_string(), value.to_string()))
}

/// Splits `field[:asc|:desc]`.
pub fn parse_sort(raw: &str) -> anyhow::Result<(String, SortDirection)> {
    let (field, direction) = match raw.rsplit_once(':') {
        Some((field, "desc")) => (field, SortDirection::Descending),
        Some((field, "asc")) => (field, SortDirection::Ascending),
        Some((_, other)) => anyhow::bail!("unknown sort direction '{other}', use asc or desc"),
        None => (raw, SortDirection::Ascending),
    };
    Ok((field.to_string(), direction))
}

/// Creates a grid over `records` and applies `options` to it.
///
/// Page selection happens last so it is clamped against the final view.
pub fn build_grid(
    records: Vec<Record>,
    options: &ListOptions,
    config: &GridConfig,
) -> anyhow::Result<GridEngine> {
    let columns = infer_columns(&records);
    let mut grid = GridEngine::new(records, columns, GridOptions::from(config).selectable())?;
    let events = grid.subscribe();

    if let Some(search) = &options.search {
        grid.set_search_text(search.as_str());
    }
    for raw in &options.filters {
        let (field, value) = parse_filter(raw)?;
        grid.set_column_filter(&field, value)
            .with_context(|| format!("cannot filter on '{field}'"))?;
    }
    if let Some(raw) = &options.sort {
        let (field, direction) = parse_sort(raw)?;
        grid.set_sort(&field, direction)
            .with_context(|| format!("cannot sort on '{field}'"))?;
    }
    if let Some(size) = options.page_size {
        grid.set_page_size(size)?;
    }
    if let Some(page) = options.page {
        grid.set_page(page);
    }

    for event in events.try_iter() {
        match event {
            GridEvent::ViewChanged { total, page_count } => {
                tracing::debug!(total, page_count, "view recomputed");
            }
            GridEvent::PageChanged { current, page_size } => {
                tracing::debug!(current, page_size, "page changed");
            }
            GridEvent::SelectionChanged { .. } => {}
        }
    }

    Ok(grid)
}
