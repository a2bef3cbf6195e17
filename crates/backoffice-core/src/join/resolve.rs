//! Join resolution over already-fetched collections.
//!
//! Everything here is pure: inputs are borrowed, outputs are fresh copies,
//! and resolving the same inputs twice yields the same records.

use serde_json::Value;
use std::collections::HashMap;

use super::spec::{EmbedSpec, JoinSpec, HIERARCHY_SEPARATOR};
use crate::record::{display_string, Record, RecordId};

/// Lookup table of one foreign collection keyed by one field.
#[derive(Debug, Default)]
pub struct ForeignIndex<'a> {
    by_key: HashMap<RecordId, &'a Record>,
}

impl<'a> ForeignIndex<'a> {
    /// Indexes `records` by `key_field`. Later records win on key clashes.
    #[must_use]
    pub fn build(records: &'a [Record], key_field: &str) -> Self {
        let mut by_key = HashMap::with_capacity(records.len());
        for record in records {
            let Some(key) = record.get(key_field).and_then(RecordId::from_value) else {
                continue;
            };
            if by_key.insert(key.clone(), record).is_some() {
                tracing::warn!(key = %key, field = key_field, "duplicate foreign key, keeping last");
            }
        }
        Self { by_key }
    }

    /// Finds the foreign record whose key equals `value`.
    #[must_use]
    pub fn lookup(&self, value: &Value) -> Option<&'a Record> {
        RecordId::from_value(value).and_then(|key| self.by_key.get(&key).copied())
    }

    /// Number of indexed records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether nothing was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Fetched foreign collections, by collection name.
pub type ForeignTables = HashMap<String, Vec<Record>>;

/// Distinct foreign collections referenced by `joins`, in first-use order.
#[must_use]
pub fn foreign_collections(joins: &[JoinSpec]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for join in joins {
        if !names.contains(&join.foreign_collection) {
            names.push(join.foreign_collection.clone());
        }
    }
    names
}

/// Compiled set of joins ready to apply to many records.
#[derive(Debug)]
pub struct JoinPlan<'a> {
    steps: Vec<(&'a JoinSpec, ForeignIndex<'a>)>,
}

impl<'a> JoinPlan<'a> {
    /// Builds one index per join. A join whose collection is missing from
    /// `tables` resolves against an empty index.
    #[must_use]
    pub fn new(joins: &'a [JoinSpec], tables: &'a ForeignTables) -> Self {
        let steps = joins
            .iter()
            .map(|join| {
                let index = tables
                    .get(&join.foreign_collection)
                    .map(|records| ForeignIndex::build(records, &join.foreign_key_field))
                    .unwrap_or_default();
                (join, index)
            })
            .collect();
        Self { steps }
    }

    /// Returns a copy of `record` with every projected field populated.
    #[must_use]
    pub fn apply(&self, record: &Record) -> Record {
        let mut out = record.clone();
        for (join, index) in &self.steps {
            match project(join, index, record) {
                Some(value) => {
                    out.insert(join.project_as.clone(), value);
                }
                None => {
                    if let Some(fallback) = &join.fallback {
                        out.insert(join.project_as.clone(), fallback.clone());
                    }
                }
            }
        }
        out
    }

    /// Applies the plan to every record.
    #[must_use]
    pub fn apply_all(&self, records: &[Record]) -> Vec<Record> {
        records.iter().map(|r| self.apply(r)).collect()
    }
}

fn project(join: &JoinSpec, index: &ForeignIndex<'_>, record: &Record) -> Option<Value> {
    let local = record.get_present(&join.local_field)?;
    let matched = index.lookup(local)?;
    let child = matched.get_present(&join.display_field)?;

    let Some(parent_field) = &join.parent_field else {
        return Some(child.clone());
    };
    let Some(parent_key) = matched.get_present(parent_field) else {
        return Some(child.clone());
    };

    let parent_name = index
        .lookup(parent_key)
        .and_then(|parent| parent.get_present(&join.display_field))
        .and_then(display_string);
    match (parent_name, display_string(child)) {
        (Some(parent), Some(child)) => {
            Some(Value::String(format!("{parent}{HIERARCHY_SEPARATOR}{child}")))
        }
        _ => {
            tracing::warn!(
                collection = %join.foreign_collection,
                parent = %parent_key,
                "parent record not found, projecting child only"
            );
            Some(child.clone())
        }
    }
}

/// Convenience wrapper: builds a [`JoinPlan`] and applies it.
#[must_use]
pub fn resolve_joins(records: &[Record], joins: &[JoinSpec], tables: &ForeignTables) -> Vec<Record> {
    JoinPlan::new(joins, tables).apply_all(records)
}

/// Groups `children` by the parent id found in `foreign_key_field`, keeping
/// their order. Children without a usable key are skipped.
#[must_use]
pub fn group_children(children: Vec<Record>, foreign_key_field: &str) -> HashMap<RecordId, Vec<Record>> {
    let mut groups: HashMap<RecordId, Vec<Record>> = HashMap::new();
    for child in children {
        if let Some(parent) = child.get(foreign_key_field).and_then(RecordId::from_value) {
            groups.entry(parent).or_default().push(child);
        }
    }
    groups
}

/// Attaches each parent's children as `spec.embed_as`, after applying the
/// embed's own joins to them. Parents without children get an empty array.
#[must_use]
pub fn embed_children(
    parents: &[Record],
    spec: &EmbedSpec,
    children: Vec<Record>,
    tables: &ForeignTables,
) -> Vec<Record> {
    let plan = JoinPlan::new(&spec.joins, tables);
    let groups = group_children(children, &spec.foreign_key_field);

    parents
        .iter()
        .map(|parent| {
            let resolved: Vec<Value> = parent
                .id()
                .and_then(|id| groups.get(&id))
                .map(|kids| kids.iter().map(|kid| plan.apply(kid).into_value()).collect())
                .unwrap_or_default();
            let mut out = parent.clone();
            out.insert(spec.embed_as.clone(), Value::Array(resolved));
            out
        })
        .collect()
}

/// Query string filter that selects the children of `parent`.
#[must_use]
pub fn child_filter(spec: &EmbedSpec, parent: &RecordId) -> (String, String) {
    (spec.foreign_key_field.clone(), parent.to_string())
}

