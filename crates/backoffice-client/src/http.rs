//! REST implementation of [`RecordStore`].

use async_trait::async_trait;
use backoffice_core::{ClientConfig, Error, Record, RecordId, Result};
use reqwest::{Client, RequestBuilder, Url};
use serde_json::{json, Map, Value};

use crate::common::{create_http_client, handle_http_error};
use crate::store::{Filters, RecordStore};

/// Talks to the record store server over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRecordStore {
    client: Client,
    base_url: String,
}

impl HttpRecordStore {
    /// Creates a store client for `config.base_url`.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            client: create_http_client(config),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Creates a store client with default timeouts.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let config = ClientConfig {
            base_url: base_url.into(),
            ..ClientConfig::default()
        };
        Self::new(&config)
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: &str) -> Result<Url> {
        self.url_for(&[collection])
    }

    fn record_url(&self, collection: &str, id: &RecordId) -> Result<Url> {
        self.url_for(&[collection, id.as_str()])
    }

    /// Appends percent-encoded path segments to the base URL.
    fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::FetchFailed(format!("invalid base url '{}': {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| {
                Error::FetchFailed(format!("base url '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends a request and decodes a JSON body of type `T`.
    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
        target: Option<(&str, &RecordId)>,
    ) -> Result<T> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::FetchFailed(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(handle_http_error(status.as_u16(), &body, target));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| Error::FetchFailed(format!("invalid response body: {e}")))
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    fn store_type(&self) -> &'static str {
        "http"
    }

    async fn list(&self, collection: &str, filters: &Filters) -> Result<Vec<Record>> {
        tracing::debug!(collection, filters = filters.len(), "GET collection");
        let request = self.client.get(self.collection_url(collection)?).query(filters);
        self.send(request, None).await
    }

    async fn get(&self, collection: &str, id: &RecordId) -> Result<Record> {
        tracing::debug!(collection, %id, "GET record");
        let request = self.client.get(self.record_url(collection, id)?);
        self.send(request, Some((collection, id))).await
    }

    async fn create(&self, collection: &str, record: Record) -> Result<Record> {
        let request = self.client.post(self.collection_url(collection)?).json(&record);
        self.send(request, None).await
    }

    async fn replace(&self, collection: &str, id: &RecordId, record: Record) -> Result<Record> {
        let request = self.client.put(self.record_url(collection, id)?).json(&record);
        self.send(request, Some((collection, id))).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &RecordId,
        patch: Map<String, Value>,
    ) -> Result<Record> {
        let request = self.client.patch(self.record_url(collection, id)?).json(&patch);
        self.send(request, Some((collection, id))).await
    }

    async fn delete(&self, collection: &str, id: &RecordId) -> Result<()> {
        let request = self.client.delete(self.record_url(collection, id)?);
        let _: Value = self.send(request, Some((collection, id))).await?;
        Ok(())
    }

    async fn change_password(
        &self,
        user_id: &RecordId,
        current: &str,
        new: &str,
    ) -> Result<Record> {
        let body = json!({"currentPassword": current, "newPassword": new});
        let request = self
            .client
            .patch(self.record_url(backoffice_core::store::USERS_COLLECTION, user_id)?)
            .json(&body);
        self.send(request, Some((backoffice_core::store::USERS_COLLECTION, user_id)))
            .await
    }
}
