//! Document database boundary.
//!
//! Catalog entities are stored as schemaless JSON documents grouped into
//! collections. The store owns identity and bookkeeping: it generates ids and
//! stamps `createdAt` / `updatedAt`, so callers never supply them.

pub mod in_memory;
pub mod postgres;
pub mod query;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value as JsonValue;
use thiserror::Error;

use aesthetica_core::DocumentId;
use aesthetica_events::{ChangeEvent, Subscription};

pub use in_memory::{CallCounts, InMemoryDocumentStore, StoreOperation};
pub use postgres::PostgresDocumentStore;
pub use query::{Direction, Filter, FilterOp, OrderBy, Query};

/// Document body: a JSON object.
pub type Document = serde_json::Map<String, JsonValue>;

/// Server-assigned keys. Stripped from caller-supplied bodies on write.
pub const ID_FIELD: &str = "id";
pub const CREATED_AT_FIELD: &str = "createdAt";
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// A document as persisted, with its store-assigned metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub data: Document,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredDocument {
    /// Field value as seen by queries.
    ///
    /// Timestamps are exposed as microseconds since the epoch so they compare
    /// numerically with each other.
    pub fn field(&self, name: &str) -> Option<JsonValue> {
        match name {
            ID_FIELD => Some(JsonValue::String(self.id.to_string())),
            CREATED_AT_FIELD => Some(JsonValue::from(self.created_at.timestamp_micros())),
            UPDATED_AT_FIELD => Some(JsonValue::from(self.updated_at.timestamp_micros())),
            other => self.data.get(other).cloned(),
        }
    }

    /// Flatten into the wire shape entities deserialize from: the body plus
    /// `id`, `createdAt` and `updatedAt` (RFC 3339).
    pub fn into_json(self) -> JsonValue {
        let mut body = self.data;
        body.insert(ID_FIELD.to_string(), JsonValue::String(self.id.into_string()));
        body.insert(
            CREATED_AT_FIELD.to_string(),
            JsonValue::String(self.created_at.to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
        body.insert(
            UPDATED_AT_FIELD.to_string(),
            JsonValue::String(self.updated_at.to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
        JsonValue::Object(body)
    }
}

/// Remove keys the store assigns itself.
pub(crate) fn strip_reserved(data: &mut Document) {
    data.remove(ID_FIELD);
    data.remove(CREATED_AT_FIELD);
    data.remove(UPDATED_AT_FIELD);
}

/// Document store operation error.
///
/// Infrastructure failures only. "Document absent" on a read is `Ok(None)`,
/// not an error; `NotFound` is reserved for writes that target a missing id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: DocumentId },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(collection: &str, id: &DocumentId) -> Self {
        Self::NotFound {
            collection: collection.to_string(),
            id: id.clone(),
        }
    }
}

/// Collection/document store.
///
/// ## Write semantics
///
/// - `insert` generates the id and stamps both timestamps.
/// - `merge` shallow-merges top-level keys and refreshes `updatedAt`. It does
///   not create missing documents.
/// - `delete` removes the document outright (no tombstone).
/// - Every committed write is announced on the change feed returned by
///   `watch`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError>;

    async fn query(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    async fn insert(&self, collection: &str, data: Document) -> Result<StoredDocument, StoreError>;

    async fn merge(
        &self,
        collection: &str,
        id: &DocumentId,
        data: Document,
    ) -> Result<StoredDocument, StoreError>;

    /// Atomically add `delta` to a numeric field (missing counts as 0).
    async fn increment(
        &self,
        collection: &str,
        id: &DocumentId,
        field: &str,
        delta: i64,
    ) -> Result<StoredDocument, StoreError>;

    async fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError>;

    /// Change notifications for one collection.
    fn watch(&self, collection: &str) -> Subscription<ChangeEvent>;
}

#[async_trait]
impl<S> DocumentStore for Arc<S>
where
    S: DocumentStore + ?Sized,
{
    async fn get(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError> {
        (**self).get(collection, id).await
    }

    async fn query(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        (**self).query(collection, query).await
    }

    async fn insert(&self, collection: &str, data: Document) -> Result<StoredDocument, StoreError> {
        (**self).insert(collection, data).await
    }

    async fn merge(
        &self,
        collection: &str,
        id: &DocumentId,
        data: Document,
    ) -> Result<StoredDocument, StoreError> {
        (**self).merge(collection, id, data).await
    }

    async fn increment(
        &self,
        collection: &str,
        id: &DocumentId,
        field: &str,
        delta: i64,
    ) -> Result<StoredDocument, StoreError> {
        (**self).increment(collection, id, field, delta).await
    }

    async fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError> {
        (**self).delete(collection, id).await
    }

    fn watch(&self, collection: &str) -> Subscription<ChangeEvent> {
        (**self).watch(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn doc() -> StoredDocument {
        let mut data = Document::new();
        data.insert("name".to_string(), json!("Serum"));
        StoredDocument {
            id: "p1".parse().unwrap(),
            data,
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn into_json_adds_identity_and_timestamps() {
        let value = doc().into_json();
        assert_eq!(value["id"], json!("p1"));
        assert_eq!(value["name"], json!("Serum"));
        assert_eq!(value["createdAt"], json!("2026-03-01T09:00:00.000000Z"));
        assert_eq!(value["updatedAt"], json!("2026-03-02T09:00:00.000000Z"));
    }

    #[test]
    fn timestamp_fields_compare_numerically() {
        let d = doc();
        let created = d.field(CREATED_AT_FIELD).unwrap().as_i64().unwrap();
        let updated = d.field(UPDATED_AT_FIELD).unwrap().as_i64().unwrap();
        assert!(created < updated);
        assert_eq!(d.field("missing"), None);
    }

    #[test]
    fn strip_reserved_drops_server_keys() {
        let mut data = Document::new();
        data.insert("id".to_string(), json!("forged"));
        data.insert("createdAt".to_string(), json!("1999-01-01T00:00:00Z"));
        data.insert("price".to_string(), json!(10));
        strip_reserved(&mut data);
        assert_eq!(data.len(), 1);
        assert!(data.contains_key("price"));
    }
}
