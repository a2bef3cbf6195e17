//! Generic data grid engine.
//!
//! [`GridEngine`] turns an arbitrary set of records plus column descriptors
//! into a searchable, filterable, sortable, paginated and selectable view. It
//! knows nothing about what the columns mean and never renders anything
//! itself; hosts read [`GridEngine::visible_slice`] and
//! [`GridEngine::cells`] and listen to [`GridEvent`]s.
//!
//! ## Usage
//!
//! ```rust
//! use backoffice_core::grid::{ColumnDescriptor, GridEngine, GridOptions, SortDirection, ValueKind};
//! use backoffice_core::Record;
//! use serde_json::json;
//!
//! let records: Vec<Record> = (1..=30)
//!     .map(|i| Record::from_value(json!({"id": i, "name": format!("item {i}")})).unwrap())
//!     .collect();
//! let columns = vec![
//!     ColumnDescriptor::new("id", "#").with_kind(ValueKind::Number),
//!     ColumnDescriptor::new("name", "Name").with_filterable(true),
//! ];
//!
//! let mut grid = GridEngine::new(records, columns, GridOptions::default()).unwrap();
//! grid.set_sort("id", SortDirection::Descending).unwrap();
//! assert_eq!(grid.page_count(), 3);
//! assert_eq!(grid.visible_slice()[0].record.get("id"), Some(&json!(30)));
//! ```

mod column;
mod compare;
mod events;

#[cfg(test)]
mod grid_tests;

pub use column::{infer_columns, ColumnDescriptor, RenderFn, ValueKind};
pub use compare::{compare_text, compare_values, contains_text};
pub use events::GridEvent;

use crossbeam_channel::Receiver;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

use crate::config::GridConfig;
use crate::error::{Error, Result};
use crate::record::{Record, RecordId};
use events::Subscribers;

/// Sort direction of the active sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Smallest first; missing values lead.
    Ascending,
    /// Largest first; missing values trail.
    Descending,
    /// Source order.
    #[default]
    None,
}

/// Construction options of a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridOptions {
    /// Whether rows can be selected.
    pub selectable: bool,
    /// Whether the global search box is active.
    pub searchable: bool,
    /// Page sizes a user may choose from.
    pub page_size_options: Vec<usize>,
    /// Page size the grid starts with; must be one of the options.
    pub initial_page_size: usize,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self::from(&GridConfig::default())
    }
}

impl From<&GridConfig> for GridOptions {
    fn from(config: &GridConfig) -> Self {
        Self {
            selectable: false,
            searchable: true,
            page_size_options: config.page_size_options.clone(),
            initial_page_size: config.effective_page_size(),
        }
    }
}

impl GridOptions {
    /// Enables row selection.
    #[must_use]
    pub fn selectable(mut self) -> Self {
        self.selectable = true;
        self
    }

    /// Sets the page size options and starts on the first of them.
    #[must_use]
    pub fn with_page_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.initial_page_size = sizes.first().copied().unwrap_or(self.initial_page_size);
        self.page_size_options = sizes;
        self
    }

    /// Sets the initial page size.
    #[must_use]
    pub fn with_initial_page_size(mut self, size: usize) -> Self {
        self.initial_page_size = size;
        self
    }

    /// Every option must be non-zero and the initial size one of them.
    fn validate(&self) -> Result<()> {
        let invalid = |size| Error::InvalidPageSize {
            size,
            allowed: self.page_size_options.clone(),
        };
        if self.page_size_options.contains(&0) {
            return Err(invalid(0));
        }
        if self.initial_page_size == 0 || !self.page_size_options.contains(&self.initial_page_size)
        {
            return Err(invalid(self.initial_page_size));
        }
        Ok(())
    }
}

/// Ephemeral view state owned by one engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// Global search text as typed.
    pub search_text: String,
    /// Active per-column filters, field → text.
    pub column_filters: IndexMap<String, String>,
    /// Field of the active sort, if any.
    pub sort_key: Option<String>,
    /// Direction of the active sort.
    pub sort_direction: SortDirection,
    /// 1-based current page.
    pub current_page: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Selected record ids, in selection order.
    pub selected_ids: IndexSet<RecordId>,
}

impl ViewState {
    fn new(page_size: usize) -> Self {
        Self {
            search_text: String::new(),
            column_filters: IndexMap::new(),
            sort_key: None,
            sort_direction: SortDirection::None,
            current_page: 1,
            page_size,
            selected_ids: IndexSet::new(),
        }
    }
}

/// One row of the current page.
#[derive(Debug, Clone, Copy)]
pub struct VisibleRow<'a> {
    /// 1-based position across all pages: `(page-1)*page_size + pos + 1`.
    pub display_index: usize,
    /// Record identifier.
    pub id: &'a RecordId,
    /// The record itself.
    pub record: &'a Record,
}

/// Presentation-agnostic table controller.
pub struct GridEngine {
    columns: Vec<ColumnDescriptor>,
    options: GridOptions,
    records: Vec<Record>,
    ids: Vec<RecordId>,
    positions: HashMap<RecordId, usize>,
    state: ViewState,
    /// Positions into `records` after search, filters and sort.
    view: Vec<usize>,
    subscribers: Subscribers,
}

impl GridEngine {
    /// Creates a grid over `records`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPageSize`] when the initial size is not an option.
    /// - [`Error::MissingId`] / [`Error::DuplicateId`] when a record cannot
    ///   be uniquely identified.
    pub fn new(
        records: Vec<Record>,
        columns: Vec<ColumnDescriptor>,
        options: GridOptions,
    ) -> Result<Self> {
        options.validate()?;
        let (ids, positions) = index_records(&records)?;
        let state = ViewState::new(options.initial_page_size);

        let mut engine = Self {
            columns,
            options,
            records,
            ids,
            positions,
            state,
            view: Vec::new(),
            subscribers: Subscribers::default(),
        };
        engine.recompute();
        Ok(engine)
    }

    /// Registers a subscriber for [`GridEvent`]s.
    pub fn subscribe(&mut self) -> Receiver<GridEvent> {
        self.subscribers.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    // ------------------------------------------------------------------
    // Source data
    // ------------------------------------------------------------------

    /// Replaces the source records.
    ///
    /// Selection entries for records that disappeared are dropped. The page
    /// is kept when still in range, else reset to 1.
    ///
    /// # Errors
    ///
    /// [`Error::MissingId`] / [`Error::DuplicateId`]; the grid is left
    /// unchanged on error.
    pub fn set_records(&mut self, records: Vec<Record>) -> Result<()> {
        let (ids, positions) = index_records(&records)?;
        self.records = records;
        self.ids = ids;
        self.positions = positions;

        let before = self.state.selected_ids.len();
        let positions = &self.positions;
        self.state.selected_ids.retain(|id| positions.contains_key(id));
        if self.state.selected_ids.len() != before {
            self.publish_selection();
        }

        self.refresh_view(false);
        Ok(())
    }

    /// Replaces the column descriptors.
    ///
    /// Sorts and filters on columns that vanished (or lost the capability)
    /// are dropped.
    pub fn set_columns(&mut self, columns: Vec<ColumnDescriptor>) {
        self.columns = columns;

        let sort_valid = self
            .state
            .sort_key
            .as_deref()
            .is_some_and(|key| self.column(key).is_some_and(|c| c.sortable));
        if !sort_valid {
            self.state.sort_key = None;
            self.state.sort_direction = SortDirection::None;
        }

        let columns = &self.columns;
        self.state
            .column_filters
            .retain(|field, _| columns.iter().any(|c| &c.field == field && c.filterable));

        self.refresh_view(false);
    }

    // ------------------------------------------------------------------
    // Search, filter, sort
    // ------------------------------------------------------------------

    /// Sets the global search text and returns to page 1.
    ///
    /// A record matches when any column's raw value contains the text,
    /// case-insensitively. Empty text disables the search. Ignored when the
    /// grid is not searchable.
    pub fn set_search_text(&mut self, text: impl Into<String>) {
        if !self.options.searchable {
            return;
        }
        self.state.search_text = text.into();
        self.refresh_view(true);
    }

    /// Sets a per-column filter and returns to page 1. An empty value clears
    /// the filter.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownColumn`] when `field` is not a filterable column.
    pub fn set_column_filter(&mut self, field: &str, value: impl Into<String>) -> Result<()> {
        match self.column(field) {
            None => return Err(unknown_column(field, "no such column")),
            Some(c) if !c.filterable => return Err(unknown_column(field, "column is not filterable")),
            Some(_) => {}
        }

        let value = value.into();
        if value.is_empty() {
            self.state.column_filters.shift_remove(field);
        } else {
            self.state.column_filters.insert(field.to_string(), value);
        }
        self.refresh_view(true);
        Ok(())
    }

    /// Removes the filter of one column, if any.
    pub fn clear_column_filter(&mut self, field: &str) {
        if self.state.column_filters.shift_remove(field).is_some() {
            self.refresh_view(true);
        }
    }

    /// Removes the search text and every column filter.
    pub fn clear_filters(&mut self) {
        self.state.search_text.clear();
        self.state.column_filters.clear();
        self.refresh_view(true);
    }

    /// Sorts by one column, replacing any previous sort.
    ///
    /// [`SortDirection::None`] restores source order; `field` is then
    /// ignored.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownColumn`] when `field` is not a sortable column.
    pub fn set_sort(&mut self, field: &str, direction: SortDirection) -> Result<()> {
        if direction == SortDirection::None {
            self.state.sort_key = None;
            self.state.sort_direction = SortDirection::None;
            self.refresh_view(false);
            return Ok(());
        }

        match self.column(field) {
            None => return Err(unknown_column(field, "no such column")),
            Some(c) if !c.sortable => return Err(unknown_column(field, "column is not sortable")),
            Some(_) => {}
        }

        self.state.sort_key = Some(field.to_string());
        self.state.sort_direction = direction;
        self.refresh_view(false);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Pagination
    // ------------------------------------------------------------------

    /// Moves to `page`, clamped into `[1, page_count]`.
    pub fn set_page(&mut self, page: usize) {
        let target = page.clamp(1, self.page_count());
        if target != self.state.current_page {
            self.state.current_page = target;
            self.publish_page();
        }
    }

    /// Changes the page size, keeping the first visible record on screen.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPageSize`] when `size` is not one of the options.
    pub fn set_page_size(&mut self, size: usize) -> Result<()> {
        if !self.options.page_size_options.contains(&size) {
            return Err(Error::InvalidPageSize {
                size,
                allowed: self.options.page_size_options.clone(),
            });
        }

        let first_visible = (self.state.current_page - 1) * self.state.page_size;
        self.state.page_size = size;
        self.state.current_page = if first_visible < self.total() {
            first_visible / size + 1
        } else {
            1
        };
        self.publish_page();
        Ok(())
    }

    /// Back to page 1 with the current view, like a reload button.
    pub fn refresh(&mut self) {
        self.refresh_view(true);
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Toggles one record. Returns whether it is selected afterwards.
    ///
    /// Unknown ids and non-selectable grids are ignored.
    pub fn toggle_select(&mut self, id: &RecordId) -> bool {
        if !self.options.selectable || !self.positions.contains_key(id) {
            return false;
        }
        let selected = if self.state.selected_ids.shift_remove(id) {
            false
        } else {
            self.state.selected_ids.insert(id.clone());
            true
        };
        self.publish_selection();
        selected
    }

    /// Selects every record matching the current search and filters, on
    /// every page. Replaces the previous selection.
    pub fn select_all(&mut self) {
        if !self.options.selectable {
            return;
        }
        self.state.selected_ids = self.view.iter().map(|&pos| self.ids[pos].clone()).collect();
        self.publish_selection();
    }

    /// Adds the rows of the current page to the selection.
    pub fn select_page(&mut self) {
        if !self.options.selectable {
            return;
        }
        let (start, end) = self.page_bounds();
        for &pos in &self.view[start..end] {
            self.state.selected_ids.insert(self.ids[pos].clone());
        }
        self.publish_selection();
    }

    /// Clears the selection.
    pub fn clear_selection(&mut self) {
        if self.state.selected_ids.is_empty() {
            return;
        }
        self.state.selected_ids.clear();
        self.publish_selection();
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Rows of the current page, after search, filters and sort.
    #[must_use]
    pub fn visible_slice(&self) -> Vec<VisibleRow<'_>> {
        let (start, end) = self.page_bounds();
        self.view[start..end]
            .iter()
            .enumerate()
            .map(|(offset, &pos)| VisibleRow {
                display_index: start + offset + 1,
                id: &self.ids[pos],
                record: &self.records[pos],
            })
            .collect()
    }

    /// Every matching record in view order, ignoring pagination.
    pub fn filtered(&self) -> impl Iterator<Item = &Record> + '_ {
        self.view.iter().map(|&pos| &self.records[pos])
    }

    /// Display text of each column for `record`.
    #[must_use]
    pub fn cells(&self, record: &Record) -> Vec<String> {
        self.columns.iter().map(|c| c.render_cell(record)).collect()
    }

    /// Matching records before pagination.
    #[must_use]
    pub fn total(&self) -> usize {
        self.view.len()
    }

    /// Number of pages; at least 1.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.total().div_ceil(self.state.page_size).max(1)
    }

    /// 1-based current page.
    #[must_use]
    pub fn current_page(&self) -> usize {
        self.state.current_page
    }

    /// Rows per page.
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.state.page_size
    }

    /// First and last 1-based item numbers on the current page, for a
    /// "`first`-`last` of `total` items" footer. `None` when nothing matches.
    #[must_use]
    pub fn range(&self) -> Option<(usize, usize)> {
        let (start, end) = self.page_bounds();
        (end > start).then_some((start + 1, end))
    }

    /// Selected ids, in selection order.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<RecordId> {
        self.state.selected_ids.iter().cloned().collect()
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn is_selected(&self, id: &RecordId) -> bool {
        self.state.selected_ids.contains(id)
    }

    /// Looks a record up by id.
    #[must_use]
    pub fn record(&self, id: &RecordId) -> Option<&Record> {
        self.positions.get(id).map(|&pos| &self.records[pos])
    }

    /// Current view state.
    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Column descriptors, in display order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Construction options.
    #[must_use]
    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn column(&self, field: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.field == field)
    }

    fn page_bounds(&self) -> (usize, usize) {
        let start = (self.state.current_page - 1) * self.state.page_size;
        let start = start.min(self.view.len());
        let end = (start + self.state.page_size).min(self.view.len());
        (start, end)
    }

    /// Recomputes the view, fixes the page and notifies subscribers.
    fn refresh_view(&mut self, reset_page: bool) {
        let before = self.state.current_page;
        self.recompute();

        let page_count = self.page_count();
        if reset_page || self.state.current_page > page_count {
            self.state.current_page = 1;
        }

        self.subscribers.publish(&GridEvent::ViewChanged {
            total: self.total(),
            page_count,
        });
        if self.state.current_page != before {
            self.publish_page();
        }
    }

    fn recompute(&mut self) {
        let search = self.state.search_text.to_lowercase();
        let filters: Vec<(&str, String)> = self
            .state
            .column_filters
            .iter()
            .map(|(field, value)| (field.as_str(), value.to_lowercase()))
            .collect();
        let columns = &self.columns;

        let mut view: Vec<usize> = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, record)| {
                (search.is_empty()
                    || columns
                        .iter()
                        .any(|c| contains_text(record.get_present(&c.field), &search)))
                    && filters
                        .iter()
                        .all(|(field, needle)| contains_text(record.get_present(field), needle))
            })
            .map(|(pos, _)| pos)
            .collect();

        if let Some(column) = self.state.sort_key.as_deref().and_then(|key| self.column(key)) {
            let direction = self.state.sort_direction;
            let records = &self.records;
            // `sort_by` is stable: ties keep their filtered order.
            view.sort_by(|&a, &b| {
                let ord = compare_values(
                    column.kind,
                    records[a].get_present(&column.field),
                    records[b].get_present(&column.field),
                );
                match direction {
                    SortDirection::Descending => ord.reverse(),
                    _ => ord,
                }
            });
        }

        tracing::debug!(
            records = self.records.len(),
            matching = view.len(),
            filters = filters.len(),
            sort = ?self.state.sort_key,
            "grid view recomputed"
        );
        self.view = view;
    }

    fn publish_selection(&mut self) {
        let selected = self.selected_ids();
        self.subscribers
            .publish(&GridEvent::SelectionChanged { selected });
    }

    fn publish_page(&mut self) {
        self.subscribers.publish(&GridEvent::PageChanged {
            current: self.state.current_page,
            page_size: self.state.page_size,
        });
    }
}

fn unknown_column(field: &str, reason: &'static str) -> Error {
    Error::UnknownColumn {
        field: field.to_string(),
        reason,
    }
}

/// Builds the id → position index, rejecting unidentifiable or duplicate
/// records.
fn index_records(records: &[Record]) -> Result<(Vec<RecordId>, HashMap<RecordId, usize>)> {
    let mut ids = Vec::with_capacity(records.len());
    let mut positions = HashMap::with_capacity(records.len());
    for (pos, record) in records.iter().enumerate() {
        let id = record.id().ok_or(Error::MissingId(pos))?;
        if positions.insert(id.clone(), pos).is_some() {
            return Err(Error::DuplicateId(id.to_string()));
        }
        ids.push(id);
    }
    Ok((ids, positions))
}
