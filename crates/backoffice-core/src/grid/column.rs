//! Column descriptors: how one record field projects into a grid cell.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::record::{display_string, Record, ID_FIELD, KEY_FIELD};

/// Expected kind of a column's values.
///
/// Chooses the sort comparator statically instead of sniffing each value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
    /// Compared as text, case-insensitively first.
    #[default]
    Text,
    /// Compared numerically. Numeric strings are accepted.
    Number,
    /// Compared as instants (RFC 3339, `YYYY-MM-DD`, or epoch milliseconds).
    Date,
}

impl ValueKind {
    /// Guesses a kind from a sample value.
    #[must_use]
    pub fn infer(sample: &Value) -> Self {
        match sample {
            Value::Number(_) => Self::Number,
            Value::String(s) if looks_like_date(s) => Self::Date,
            _ => Self::Text,
        }
    }
}

fn looks_like_date(s: &str) -> bool {
    s.get(..10)
        .is_some_and(|day| chrono::NaiveDate::parse_from_str(day, "%Y-%m-%d").is_ok())
}

/// Pure projection from a raw value (and its record) to display text.
pub type RenderFn = Arc<dyn Fn(&Value, &Record) -> String + Send + Sync>;

/// Declares how one field of a record projects into a cell.
#[derive(Clone)]
pub struct ColumnDescriptor {
    /// Record field read by this column (dot notation allowed).
    pub field: String,
    /// Header text.
    pub header: String,
    /// Whether the column can be sorted on.
    pub sortable: bool,
    /// Whether the column accepts a per-column filter.
    pub filterable: bool,
    /// Preferred width in characters, if any.
    pub width: Option<u16>,
    /// Expected value kind.
    pub kind: ValueKind,
    render: Option<RenderFn>,
}

impl ColumnDescriptor {
    /// Creates a sortable, non-filterable text column.
    pub fn new(field: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            header: header.into(),
            sortable: true,
            filterable: false,
            width: None,
            kind: ValueKind::Text,
            render: None,
        }
    }

    /// Sets the value kind.
    #[must_use]
    pub fn with_kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }

    /// Enables or disables sorting.
    #[must_use]
    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Enables or disables the per-column filter.
    #[must_use]
    pub fn with_filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    /// Sets the preferred width.
    #[must_use]
    pub fn with_width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets a display projection. It must be free of side effects.
    #[must_use]
    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&Value, &Record) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    /// Display text of this column for `record`.
    ///
    /// Missing fields render through `render` as JSON null, or as an empty
    /// string without one.
    #[must_use]
    pub fn render_cell(&self, record: &Record) -> String {
        let value = record.get(&self.field);
        match &self.render {
            Some(render) => render(value.unwrap_or(&Value::Null), record),
            None => value.and_then(display_string).unwrap_or_default(),
        }
    }
}

impl fmt::Debug for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("field", &self.field)
            .field("header", &self.header)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("width", &self.width)
            .field("kind", &self.kind)
            .field("render", &self.render.is_some())
            .finish()
    }
}

/// Derives filterable columns from the fields of the first record.
///
/// Identifier fields come first; nested objects and arrays are skipped.
#[must_use]
pub fn infer_columns(records: &[Record]) -> Vec<ColumnDescriptor> {
    let Some(first) = records.first() else {
        return Vec::new();
    };

    let mut columns: Vec<ColumnDescriptor> = first
        .fields()
        .iter()
        .filter(|(_, value)| !value.is_object() && !value.is_array())
        .map(|(field, value)| {
            ColumnDescriptor::new(field.clone(), header_for(field))
                .with_kind(ValueKind::infer(value))
                .with_filterable(true)
        })
        .collect();

    columns.sort_by_key(|c| c.field != ID_FIELD && c.field != KEY_FIELD);
    columns
}

fn header_for(field: &str) -> String {
    field
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            chars.next().map_or_else(String::new, |c| {
                c.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
