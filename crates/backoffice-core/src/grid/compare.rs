//! Kind-aware comparison and text matching for grid cells.
//!
//! Both work on raw field values, never on rendered text. An absent or null
//! value is the minimal value for ordering and never matches a text filter.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use std::cmp::Ordering;

use super::column::ValueKind;
use crate::record::display_string;

/// Compares two optional field values under the ordering of `kind`.
///
/// Values that cannot be read as `kind` (e.g. `"n/a"` in a number column)
/// sort with the missing ones.
#[must_use]
pub fn compare_values(kind: ValueKind, a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match kind {
        ValueKind::Text => {
            compare_keys(a.and_then(display_string), b.and_then(display_string), |x, y| {
                compare_text(x, y)
            })
        }
        ValueKind::Number => compare_keys(a.and_then(number_key), b.and_then(number_key), |x, y| {
            x.total_cmp(y)
        }),
        ValueKind::Date => compare_keys(a.and_then(date_key), b.and_then(date_key), |x, y| x.cmp(y)),
    }
}

fn compare_keys<K>(a: Option<K>, b: Option<K>, cmp: impl Fn(&K, &K) -> Ordering) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => cmp(&a, &b),
    }
}

/// Locale-style text ordering.
///
/// Letters compare case-insensitively first; when two strings differ only by
/// case, the lowercase form sorts first (`"apple" < "Apple" < "banana"`).
///
/// There is no collation table: after case folding, characters order by
/// code point. Accented letters therefore sort after the unaccented
/// alphabet (`"zebra" < "éclair"`), not next to their base letter.
#[must_use]
pub fn compare_text(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| {
        a.chars()
            .zip(b.chars())
            .find(|(x, y)| x != y)
            .map_or(Ordering::Equal, |(x, y)| {
                x.is_uppercase().cmp(&y.is_uppercase())
            })
    })
}

fn number_key(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| !f.is_nan()),
        _ => None,
    }
}

/// Milliseconds since the Unix epoch.
fn date_key(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => parse_instant(s.trim()),
        _ => None,
    }
}

fn parse_instant(s: &str) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc().timestamp_millis());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc().timestamp_millis());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Case-insensitive substring test on the string form of a raw value.
///
/// `needle_lower` must already be lowercased.
#[must_use]
pub fn contains_text(value: Option<&Value>, needle_lower: &str) -> bool {
    value
        .and_then(display_string)
        .is_some_and(|text| text.to_lowercase().contains(needle_lower))
}
