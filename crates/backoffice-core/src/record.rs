//! Records: open field maps identified by `id` (or `key`).
//!
//! Every layer of the toolkit moves records around as JSON objects. The only
//! structure they are required to have is an identifier, normalised here into
//! a [`RecordId`] so that `42` and `"42"` name the same record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Field name holding the primary identifier.
pub const ID_FIELD: &str = "id";

/// Fallback identifier field, used when `id` is absent.
pub const KEY_FIELD: &str = "key";

/// Normalised record identifier.
///
/// Strings are kept as-is, integral numbers are rendered in decimal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Creates an identifier from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Normalises a JSON value into an identifier.
    ///
    /// Returns `None` for values that cannot identify a record (null, bool,
    /// arrays, objects, empty strings).
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(_) => display_string(value).map(Self),
            _ => None,
        }
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when `value` normalises to this identifier.
    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        Self::from_value(value).is_some_and(|other| other == *self)
    }

    /// JSON form used when writing the id back into a record.
    ///
    /// Decimal ids become numbers so numeric collections stay numeric.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self.0.parse::<u64>() {
            Ok(n) if n.to_string() == self.0 => Value::from(n),
            _ => Value::String(self.0.clone()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

/// One row of a collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wraps a JSON object. Returns `None` for any other JSON kind.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Record identifier, taken from `id` and then `key`.
    #[must_use]
    pub fn id(&self) -> Option<RecordId> {
        self.0
            .get(ID_FIELD)
            .and_then(RecordId::from_value)
            .or_else(|| self.0.get(KEY_FIELD).and_then(RecordId::from_value))
    }

    /// Reads a field. Dot notation reaches into nested objects
    /// (`metrics.clicks`).
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        if let Some(value) = self.0.get(field) {
            return Some(value);
        }
        let mut parts = field.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Reads a field, treating JSON `null` as absent.
    #[must_use]
    pub fn get_present(&self, field: &str) -> Option<&Value> {
        self.get(field).filter(|v| !v.is_null())
    }

    /// Sets a top-level field, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Removes a top-level field.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Shallow merge: every top-level field of `patch` overwrites ours.
    pub fn merge(&mut self, patch: &Map<String, Value>) {
        for (field, value) in patch {
            self.0.insert(field.clone(), value.clone());
        }
    }

    /// Borrow the underlying field map.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consumes the record, returning its field map.
    #[must_use]
    pub fn into_fields(self) -> Map<String, Value> {
        self.0
    }

    /// Consumes the record, returning a JSON object.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// String form of a scalar, as shown to a user and as matched by text search.
///
/// Null yields `None` (it never matches a text filter). Integral floats drop
/// their fractional part, arrays join their elements with commas and objects
/// fall back to compact JSON.
#[must_use]
pub fn display_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                let f = n.as_f64()?;
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    Some(format!("{f:.0}"))
                } else {
                    Some(f.to_string())
                }
            }
        }
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| display_string(item).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}
