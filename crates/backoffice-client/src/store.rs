//! Record store abstraction.
//!
//! [`RecordStore`] is the seam between the resource client and wherever the
//! records live: the REST server ([`crate::HttpRecordStore`]) or an
//! in-process [`Database`].

use async_trait::async_trait;
use backoffice_core::{Database, Record, RecordId, Result};
use serde_json::{Map, Value};

/// Exact-match query filters, `field=value`.
pub type Filters = [(String, String)];

/// CRUD access to named collections of records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Short name used in logs.
    fn store_type(&self) -> &'static str;

    /// Records of `collection` matching every filter.
    async fn list(&self, collection: &str, filters: &Filters) -> Result<Vec<Record>>;

    /// One record; [`backoffice_core::Error::NotFound`] when absent.
    async fn get(&self, collection: &str, id: &RecordId) -> Result<Record>;

    /// Creates a record and returns it with its id.
    async fn create(&self, collection: &str, record: Record) -> Result<Record>;

    /// Replaces a record.
    async fn replace(&self, collection: &str, id: &RecordId, record: Record) -> Result<Record>;

    /// Shallow-merges `patch` into a record.
    async fn update(&self, collection: &str, id: &RecordId, patch: Map<String, Value>)
        -> Result<Record>;

    /// Deletes a record.
    async fn delete(&self, collection: &str, id: &RecordId) -> Result<()>;

    /// Changes a user's password after checking the current one.
    async fn change_password(&self, user_id: &RecordId, current: &str, new: &str)
        -> Result<Record>;
}

#[async_trait]
impl RecordStore for Database {
    fn store_type(&self) -> &'static str {
        "local"
    }

    async fn list(&self, collection: &str, filters: &Filters) -> Result<Vec<Record>> {
        Database::list(self, collection, filters)
    }

    async fn get(&self, collection: &str, id: &RecordId) -> Result<Record> {
        Database::get(self, collection, id)
    }

    async fn create(&self, collection: &str, record: Record) -> Result<Record> {
        self.insert(collection, record)
    }

    async fn replace(&self, collection: &str, id: &RecordId, record: Record) -> Result<Record> {
        Database::replace(self, collection, id, record)
    }

    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        patch: Map<String, Value>,
    ) -> Result<Record> {
        self.merge(collection, id, &patch)
    }

    async fn delete(&self, collection: &str, id: &RecordId) -> Result<()> {
        Database::delete(self, collection, id).map(|_| ())
    }

    async fn change_password(
        &self,
        user_id: &RecordId,
        current: &str,
        new: &str,
    ) -> Result<Record> {
        Database::change_password(self, user_id, current, new)
    }
}
