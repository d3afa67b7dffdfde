//! Catalog gateways: typed operations over the document and object stores.
//!
//! ## Failure semantics
//!
//! - A missing backend handle is [`GatewayError::NotInitialized`], raised
//!   before any store call.
//! - Single-entity lookups that find nothing return `Ok(None)`.
//! - Any other failure is logged with its backend detail and surfaced as
//!   [`GatewayError::Operation`] with a fixed message. The backend error stays
//!   reachable through `source()`.
//! - Nothing is retried.

pub mod collection;
pub mod content;
pub mod products;
pub mod subscription;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, warn};

use aesthetica_core::DomainError;

use crate::objects::ObjectStoreError;
use crate::store::{Document, StoreError, StoredDocument};

pub use collection::CollectionGateway;
pub use content::{BrandGateway, EventGateway, MediaGateway};
pub use products::ProductGateway;
pub use subscription::{LiveQuery, ProductSubscription};

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Underlying cause of a failed gateway operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Objects(#[from] ObjectStoreError),

    /// A spawned task panicked or was cancelled.
    #[error("task failed: {0}")]
    Task(String),
}

impl BackendError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BackendError::Store(StoreError::NotFound { .. })
                | BackendError::Objects(ObjectStoreError::NotFound(_))
        )
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{service} is not initialized")]
    NotInitialized { service: &'static str },

    #[error("{message}")]
    Operation {
        message: String,
        #[source]
        source: BackendError,
    },

    /// Some requests of a bulk operation failed. Requests that succeeded are
    /// not rolled back.
    #[error("{message}: {failed} of {total} requests failed")]
    Bulk {
        message: String,
        failed: usize,
        total: usize,
        #[source]
        first: BackendError,
    },

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl GatewayError {
    pub fn not_initialized(service: &'static str) -> Self {
        Self::NotInitialized { service }
    }

    /// Log `source` and wrap it behind a fixed message.
    pub(crate) fn operation(message: impl Into<String>, source: impl Into<BackendError>) -> Self {
        let message = message.into();
        let source = source.into();
        error!(error = %source, "{message}");
        Self::Operation { message, source }
    }

    /// The operation targeted a document or object that does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            GatewayError::Operation { source, .. } => source.is_not_found(),
            GatewayError::Domain(DomainError::NotFound) => true,
            _ => false,
        }
    }
}

/// Serialize a typed payload into a document body.
pub(crate) fn to_document<S: Serialize>(value: &S) -> Result<Document, StoreError> {
    match serde_json::to_value(value) {
        Ok(JsonValue::Object(body)) => Ok(body),
        Ok(other) => Err(StoreError::Serialization(format!(
            "expected a JSON object, got {other}"
        ))),
        Err(e) => Err(StoreError::Serialization(e.to_string())),
    }
}

/// Decode one stored document into an entity.
pub(crate) fn decode<T: DeserializeOwned>(doc: StoredDocument) -> Result<T, StoreError> {
    let id = doc.id.clone();
    serde_json::from_value(doc.into_json())
        .map_err(|e| StoreError::Serialization(format!("document {id}: {e}")))
}

/// Decode a result set, skipping (and logging) documents that do not decode.
pub(crate) fn decode_all<T: DeserializeOwned>(collection: &str, docs: Vec<StoredDocument>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| match decode(doc) {
            Ok(entity) => Some(entity),
            Err(e) => {
                warn!(collection, error = %e, "skipping undecodable document");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn operation_errors_hide_backend_detail() {
        let err = GatewayError::operation(
            "failed to fetch products",
            StoreError::Backend("connection reset by peer".to_string()),
        );
        assert_eq!(err.to_string(), "failed to fetch products");
        let source = err.source().map(|s| s.to_string()).unwrap_or_default();
        assert!(source.contains("connection reset"));
    }

    #[test]
    fn not_found_is_detected_through_the_source() {
        let id = "p1".parse().unwrap();
        let err = GatewayError::operation(
            "failed to update product",
            StoreError::not_found("products", &id),
        );
        assert!(err.is_not_found());
        assert!(!GatewayError::not_initialized("document store").is_not_found());
    }

    #[test]
    fn bulk_errors_report_counts() {
        let err = GatewayError::Bulk {
            message: "failed to delete products".to_string(),
            failed: 1,
            total: 3,
            first: BackendError::Task("boom".to_string()),
        };
        assert_eq!(err.to_string(), "failed to delete products: 1 of 3 requests failed");
    }

    #[test]
    fn to_document_rejects_non_objects() {
        assert!(to_document(&42).is_err());
        assert_eq!(to_document(&serde_json::json!({ "a": 1 })).unwrap().len(), 1);
    }
}
