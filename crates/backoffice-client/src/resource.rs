//! Resource client: record store access with client-side joins.
//!
//! Composite reads fetch the base collection and every foreign collection
//! concurrently, then denormalise locally. Any failed fetch fails the whole
//! call; no partial data is ever returned.

use backoffice_core::join::{
    child_filter, embed_children, foreign_collections, presets, resolve_joins, ForeignTables,
};
use backoffice_core::store::{timestamp_now, CREATED_AT_FIELD, UPDATED_AT_FIELD, USERS_COLLECTION};
use backoffice_core::{EmbedSpec, JoinSpec, Record, RecordId, Result};
use futures::future::try_join_all;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::store::{Filters, RecordStore};

/// Collection names used by the entity helpers.
pub mod collections {
    /// Catalogue products.
    pub const PRODUCTS: &str = "products";
    /// Product categories (two-level).
    pub const CATEGORIES: &str = "categories";
    /// Customer orders.
    pub const ORDERS: &str = "orders";
    /// User accounts.
    pub const USERS: &str = super::USERS_COLLECTION;
}

/// Field carrying an order's lifecycle status.
pub const STATUS_FIELD: &str = "status";

/// High-level access to shop resources on top of a [`RecordStore`].
pub struct ResourceClient<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for ResourceClient<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: RecordStore + 'static> ResourceClient<S> {
    /// Wraps a store.
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

impl<S: RecordStore + ?Sized> ResourceClient<S> {
    /// Wraps a shared store.
    pub fn from_arc(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    // ------------------------------------------------------------------
    // Plain reads
    // ------------------------------------------------------------------

    /// Records of `collection` matching `query`.
    pub async fn list(&self, collection: &str, query: &Filters) -> Result<Vec<Record>> {
        self.store.list(collection, query).await
    }

    /// One record.
    pub async fn get(&self, collection: &str, id: &RecordId) -> Result<Record> {
        self.store.get(collection, id).await
    }

    // ------------------------------------------------------------------
    // Joined reads
    // ------------------------------------------------------------------

    /// Lists `collection` with every join projected onto each record.
    ///
    /// Unmatched keys project the join's fallback, or nothing.
    pub async fn list_with_joins(
        &self,
        collection: &str,
        query: &Filters,
        joins: &[JoinSpec],
    ) -> Result<Vec<Record>> {
        let (base, tables) =
            futures::try_join!(self.store.list(collection, query), self.fetch_tables(joins))?;

        tracing::debug!(
            collection,
            records = base.len(),
            joins = joins.len(),
            "resolved joined list"
        );
        Ok(resolve_joins(&base, joins, &tables))
    }

    /// Gets one record of `collection` with every join projected.
    ///
    /// Fails with [`backoffice_core::Error::NotFound`] when the id is absent.
    pub async fn get_one_with_joins(
        &self,
        collection: &str,
        id: &RecordId,
        joins: &[JoinSpec],
    ) -> Result<Record> {
        let (base, tables) =
            futures::try_join!(self.store.get(collection, id), self.fetch_tables(joins))?;
        Ok(resolve_joins(std::slice::from_ref(&base), joins, &tables)
            .pop()
            .unwrap_or(base))
    }

    /// Lists `collection` with joins applied and child collections embedded.
    pub async fn list_with_embeds(
        &self,
        collection: &str,
        query: &Filters,
        joins: &[JoinSpec],
        embeds: &[EmbedSpec],
    ) -> Result<Vec<Record>> {
        let children = try_join_all(
            embeds
                .iter()
                .map(|embed| self.store.list(&embed.collection, &[])),
        );
        let every_join = all_joins(joins, embeds);
        let (base, tables, children) = futures::try_join!(
            self.store.list(collection, query),
            self.fetch_tables(&every_join),
            children
        )?;

        Ok(attach(resolve_joins(&base, joins, &tables), embeds, children, &tables))
    }

    /// Gets one record with joins applied and child collections embedded.
    ///
    /// Children are fetched with `?{foreign_key_field}={id}`.
    pub async fn get_one_with_embeds(
        &self,
        collection: &str,
        id: &RecordId,
        joins: &[JoinSpec],
        embeds: &[EmbedSpec],
    ) -> Result<Record> {
        let child_filters: Vec<[(String, String); 1]> = embeds
            .iter()
            .map(|embed| [child_filter(embed, id)])
            .collect();
        let children = try_join_all(
            embeds
                .iter()
                .zip(&child_filters)
                .map(|(embed, filter)| self.store.list(&embed.collection, filter)),
        );
        let every_join = all_joins(joins, embeds);
        let (base, tables, children) = futures::try_join!(
            self.store.get(collection, id),
            self.fetch_tables(&every_join),
            children
        )?;

        let joined = resolve_joins(std::slice::from_ref(&base), joins, &tables);
        Ok(attach(joined, embeds, children, &tables)
            .pop()
            .unwrap_or(base))
    }

    /// Fetches every distinct foreign collection named by `joins`.
    async fn fetch_tables(&self, joins: &[JoinSpec]) -> Result<ForeignTables> {
        let names = foreign_collections(joins);
        let fetched = try_join_all(names.iter().map(|name| self.store.list(name, &[]))).await?;
        Ok(names.into_iter().zip(fetched).collect())
    }

    // ------------------------------------------------------------------
    // Entity helpers
    // ------------------------------------------------------------------

    /// Products with `category_name`.
    pub async fn products(&self) -> Result<Vec<Record>> {
        self.list_with_joins(collections::PRODUCTS, &[], &[presets::product_category()])
            .await
    }

    /// One product with `category_name` and its `variants`.
    pub async fn product(&self, id: &RecordId) -> Result<Record> {
        self.get_one_with_embeds(
            collections::PRODUCTS,
            id,
            &[presets::product_category()],
            &[presets::product_variants()],
        )
        .await
    }

    /// Orders with `customer_name`.
    pub async fn orders(&self) -> Result<Vec<Record>> {
        self.list_with_joins(collections::ORDERS, &[], &[presets::order_customer()])
            .await
    }

    /// One order with `customer_name` and its `items`, each carrying
    /// `product_name`.
    pub async fn order(&self, id: &RecordId) -> Result<Record> {
        self.get_one_with_embeds(
            collections::ORDERS,
            id,
            &[presets::order_customer()],
            &[presets::order_items()],
        )
        .await
    }

    /// Orders placed by one customer.
    pub async fn customer_orders(&self, user_id: &RecordId) -> Result<Vec<Record>> {
        let query = [("user_id".to_string(), user_id.to_string())];
        self.store.list(collections::ORDERS, &query).await
    }

    /// Users, optionally restricted to one role.
    pub async fn users(&self, role: Option<&str>) -> Result<Vec<Record>> {
        let query: Vec<(String, String)> = role
            .map(|r| vec![("role".to_string(), r.to_string())])
            .unwrap_or_default();
        self.store.list(collections::USERS, &query).await
    }

    /// Categories.
    pub async fn categories(&self) -> Result<Vec<Record>> {
        self.store.list(collections::CATEGORIES, &[]).await
    }

    // ------------------------------------------------------------------
    // Mutators
    // ------------------------------------------------------------------

    /// Creates a record stamped with `created_at` and `updated_at`.
    pub async fn create(&self, collection: &str, mut record: Record) -> Result<Record> {
        let now = timestamp_now();
        record.insert(CREATED_AT_FIELD, now.clone());
        record.insert(UPDATED_AT_FIELD, now);
        self.store.create(collection, record).await
    }

    /// Replaces a record, stamping `updated_at`.
    pub async fn replace(&self, collection: &str, id: &RecordId, mut record: Record) -> Result<Record> {
        record.insert(UPDATED_AT_FIELD, timestamp_now());
        self.store.replace(collection, id, record).await
    }

    /// Merges `patch` into a record, stamping `updated_at`.
    pub async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        mut patch: Map<String, Value>,
    ) -> Result<Record> {
        patch.insert(UPDATED_AT_FIELD.to_string(), Value::String(timestamp_now()));
        self.store.update(collection, id, patch).await
    }

    /// Deletes a record.
    pub async fn delete(&self, collection: &str, id: &RecordId) -> Result<()> {
        self.store.delete(collection, id).await
    }

    /// Deletes every id concurrently, e.g. a grid selection.
    ///
    /// Fails when any single delete fails; deletes that already went
    /// through are not rolled back.
    pub async fn bulk_delete(&self, collection: &str, ids: &[RecordId]) -> Result<usize> {
        try_join_all(ids.iter().map(|id| self.store.delete(collection, id))).await?;
        tracing::info!(collection, count = ids.len(), "bulk delete finished");
        Ok(ids.len())
    }

    /// Moves an order to `status`.
    pub async fn update_order_status(&self, id: &RecordId, status: &str) -> Result<Record> {
        let mut patch = Map::new();
        patch.insert(STATUS_FIELD.to_string(), Value::String(status.to_string()));
        self.update(collections::ORDERS, id, patch).await
    }

    /// Changes a user's password.
    pub async fn change_password(&self, user_id: &RecordId, current: &str, new: &str) -> Result<Record> {
        self.store.change_password(user_id, current, new).await
    }
}

fn all_joins(joins: &[JoinSpec], embeds: &[EmbedSpec]) -> Vec<JoinSpec> {
    joins
        .iter()
        .chain(embeds.iter().flat_map(|embed| embed.joins.iter()))
        .cloned()
        .collect()
}

fn attach(
    mut records: Vec<Record>,
    embeds: &[EmbedSpec],
    children: Vec<Vec<Record>>,
    tables: &ForeignTables,
) -> Vec<Record> {
    for (embed, kids) in embeds.iter().zip(children) {
        records = embed_children(&records, embed, kids, tables);
    }
    records
}
