//! JSON document record store.
//!
//! A [`Database`] holds named collections of records, loaded from a
//! `db.json`-style document (`{"users": [...], "products": [...]}`) and
//! optionally written back after every mutation.

use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::record::{display_string, Record, RecordId, ID_FIELD};

/// Collection holding user accounts.
pub const USERS_COLLECTION: &str = "users";

/// Field holding a user's password.
pub const PASSWORD_FIELD: &str = "password";

/// Field stamped on every write.
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Field stamped on creation.
pub const CREATED_AT_FIELD: &str = "created_at";

/// Current instant as an ISO-8601 UTC string with millisecond precision.
#[must_use]
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// In-memory collections, optionally backed by a JSON file.
#[derive(Debug)]
pub struct Database {
    /// File written after each mutation, if any.
    path: Option<PathBuf>,
    /// Collections in document order.
    collections: RwLock<IndexMap<String, Vec<Record>>>,
    /// Serialises file writes; held across snapshot, write and rename.
    persist_lock: Mutex<()>,
}

impl Database {
    /// Opens the document at `path`.
    ///
    /// A missing file yields an empty database. With `persist`, every
    /// mutation rewrites the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON object
    /// of record arrays.
    pub fn open<P: AsRef<Path>>(path: P, persist: bool) -> Result<Self> {
        let path = path.as_ref();
        let collections = if path.exists() {
            let text = std::fs::read_to_string(path)?;
            parse_document(serde_json::from_str(&text)?)?
        } else {
            tracing::warn!(path = %path.display(), "database file not found, starting empty");
            IndexMap::new()
        };

        tracing::info!(
            path = %path.display(),
            collections = collections.len(),
            persist,
            "database opened"
        );

        Ok(Self {
            path: persist.then(|| path.to_path_buf()),
            collections: RwLock::new(collections),
            persist_lock: Mutex::new(()),
        })
    }

    /// Builds a memory-only database from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if `document` is not an object of record arrays.
    pub fn from_value(document: Value) -> Result<Self> {
        Ok(Self {
            path: None,
            collections: RwLock::new(parse_document(document)?),
            persist_lock: Mutex::new(()),
        })
    }

    /// Names of all collections, in document order.
    #[must_use]
    pub fn collections(&self) -> Vec<String> {
        self.collections.read().keys().cloned().collect()
    }

    /// Returns the records of `collection` whose fields equal every filter.
    ///
    /// Filters compare the string form of the field, so `?user_id=3` matches
    /// both `3` and `"3"`.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionNotFound`] for an unknown collection.
    pub fn list(&self, collection: &str, filters: &[(String, String)]) -> Result<Vec<Record>> {
        let guard = self.collections.read();
        let records = guard
            .get(collection)
            .ok_or_else(|| Error::CollectionNotFound(collection.to_string()))?;

        Ok(records
            .iter()
            .filter(|record| {
                filters.iter().all(|(field, expected)| {
                    record
                        .get(field)
                        .and_then(display_string)
                        .is_some_and(|actual| actual == *expected)
                })
            })
            .cloned()
            .collect())
    }

    /// Returns one record.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionNotFound`] or [`Error::NotFound`].
    pub fn get(&self, collection: &str, id: &RecordId) -> Result<Record> {
        let guard = self.collections.read();
        let records = guard
            .get(collection)
            .ok_or_else(|| Error::CollectionNotFound(collection.to_string()))?;
        records
            .iter()
            .find(|r| r.id().as_ref() == Some(id))
            .cloned()
            .ok_or_else(|| Error::not_found(collection, id.as_str()))
    }

    /// Appends a record, assigning an id when it has none.
    ///
    /// Assigned ids continue the integer sequence when every existing id is
    /// an integer, else they are UUID v4 strings.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionNotFound`], or [`Error::DuplicateId`] when the
    /// supplied id is taken.
    pub fn insert(&self, collection: &str, mut record: Record) -> Result<Record> {
        let created = {
            let mut guard = self.collections.write();
            let records = guard
                .get_mut(collection)
                .ok_or_else(|| Error::CollectionNotFound(collection.to_string()))?;

            match record.id() {
                Some(id) => {
                    if records.iter().any(|r| r.id().as_ref() == Some(&id)) {
                        return Err(Error::DuplicateId(id.to_string()));
                    }
                }
                None => {
                    record.insert(ID_FIELD, next_id(records));
                }
            }
            records.push(record.clone());
            record
        };

        tracing::debug!(collection, id = ?created.id(), "record inserted");
        self.persist()?;
        Ok(created)
    }

    /// Replaces a record wholesale. The stored id is kept whatever the body
    /// says.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionNotFound`] or [`Error::NotFound`].
    pub fn replace(&self, collection: &str, id: &RecordId, mut record: Record) -> Result<Record> {
        let replaced = self.with_record(collection, id, |stored| {
            if let Some(original) = stored.get(ID_FIELD).cloned() {
                record.insert(ID_FIELD, original);
            }
            *stored = record;
            stored.clone()
        })?;
        self.persist()?;
        Ok(replaced)
    }

    /// Shallow-merges `patch` into a record. An `id` in the patch is ignored.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionNotFound`] or [`Error::NotFound`].
    pub fn merge(&self, collection: &str, id: &RecordId, patch: &Map<String, Value>) -> Result<Record> {
        let merged = self.with_record(collection, id, |stored| {
            for (field, value) in patch {
                if field != ID_FIELD {
                    stored.insert(field.clone(), value.clone());
                }
            }
            stored.clone()
        })?;
        self.persist()?;
        Ok(merged)
    }

    /// Removes a record and returns it.
    ///
    /// # Errors
    ///
    /// [`Error::CollectionNotFound`] or [`Error::NotFound`].
    pub fn delete(&self, collection: &str, id: &RecordId) -> Result<Record> {
        let removed = {
            let mut guard = self.collections.write();
            let records = guard
                .get_mut(collection)
                .ok_or_else(|| Error::CollectionNotFound(collection.to_string()))?;
            let pos = records
                .iter()
                .position(|r| r.id().as_ref() == Some(id))
                .ok_or_else(|| Error::not_found(collection, id.as_str()))?;
            records.remove(pos)
        };

        tracing::debug!(collection, %id, "record deleted");
        self.persist()?;
        Ok(removed)
    }

    /// Changes a user's password after checking the current one.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] when the user does not exist.
    /// - [`Error::Unauthorized`] when `current` does not match; nothing is
    ///   written in that case.
    pub fn change_password(&self, user_id: &RecordId, current: &str, new: &str) -> Result<Record> {
        let now = timestamp_now();
        let updated = {
            let mut guard = self.collections.write();
            let user = guard
                .get_mut(USERS_COLLECTION)
                .and_then(|users| users.iter_mut().find(|u| u.id().as_ref() == Some(user_id)))
                .ok_or_else(|| Error::not_found(USERS_COLLECTION, user_id.as_str()))?;

            let stored = user.get(PASSWORD_FIELD).and_then(Value::as_str);
            if stored != Some(current) {
                tracing::warn!(user = %user_id, "password change rejected");
                return Err(Error::Unauthorized("Current password is incorrect".to_string()));
            }

            user.insert(PASSWORD_FIELD, new);
            user.insert(UPDATED_AT_FIELD, now);
            user.clone()
        };

        tracing::info!(user = %user_id, "password changed");
        self.persist()?;
        Ok(updated)
    }

    /// The whole document as JSON.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        let guard = self.collections.read();
        let document: Map<String, Value> = guard
            .iter()
            .map(|(name, records)| {
                let rows = records.iter().cloned().map(Record::into_value).collect();
                (name.clone(), Value::Array(rows))
            })
            .collect();
        Value::Object(document)
    }

    /// Backing file, when persistence is on.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn with_record<T>(
        &self,
        collection: &str,
        id: &RecordId,
        f: impl FnOnce(&mut Record) -> T,
    ) -> Result<T> {
        let mut guard = self.collections.write();
        let records = guard
            .get_mut(collection)
            .ok_or_else(|| Error::CollectionNotFound(collection.to_string()))?;
        let record = records
            .iter_mut()
            .find(|r| r.id().as_ref() == Some(id))
            .ok_or_else(|| Error::not_found(collection, id.as_str()))?;
        Ok(f(record))
    }

    /// Writes the document next to its target, then renames it into place.
    ///
    /// The snapshot is taken under `persist_lock`, so the last writer to
    /// finish always leaves the latest state on disk.
    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let _guard = self.persist_lock.lock();
        let text = serde_json::to_string_pretty(&self.snapshot())?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

fn parse_document(document: Value) -> Result<IndexMap<String, Vec<Record>>> {
    let Value::Object(map) = document else {
        return Err(Error::ValidationFailed(
            "database document must be a JSON object".to_string(),
        ));
    };

    map.into_iter()
        .map(|(name, rows)| {
            let Value::Array(rows) = rows else {
                return Err(Error::ValidationFailed(format!(
                    "collection '{name}' must be an array"
                )));
            };
            let records = rows
                .into_iter()
                .map(|row| {
                    Record::from_value(row).ok_or_else(|| {
                        Error::ValidationFailed(format!("collection '{name}' holds a non-object"))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            Ok((name, records))
        })
        .collect()
}

fn next_id(records: &[Record]) -> Value {
    let numeric: Option<Vec<u64>> = records
        .iter()
        .map(|r| r.get(ID_FIELD).and_then(Value::as_u64))
        .collect();
    match numeric {
        Some(ids) => Value::from(ids.into_iter().max().map_or(1, |max| max + 1)),
        None => Value::String(uuid::Uuid::new_v4().to_string()),
    }
}
