//! Handles to the hosted services a gateway talks to.
//!
//! A backend may be constructed empty and wired later (e.g. after async
//! connection setup). Gateways check for a handle before every call and fail
//! with [`GatewayError::NotInitialized`] when it is missing, without touching
//! anything else.

use std::sync::{Arc, OnceLock};

use anyhow::Context;
use tracing::info;

use crate::config::CatalogConfig;
use crate::gateway::GatewayError;
use crate::objects::{InMemoryObjectStore, LocalDirObjectStore, ObjectStore};
use crate::store::{DocumentStore, InMemoryDocumentStore, PostgresDocumentStore};

pub const DOCUMENT_STORE_SERVICE: &str = "document store";
pub const OBJECT_STORE_SERVICE: &str = "object storage";

#[derive(Default)]
pub struct CatalogBackend {
    store: OnceLock<Arc<dyn DocumentStore>>,
    objects: OnceLock<Arc<dyn ObjectStore>>,
}

impl std::fmt::Debug for CatalogBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogBackend")
            .field("store", &self.store.get().is_some())
            .field("objects", &self.objects.get().is_some())
            .finish()
    }
}

impl CatalogBackend {
    /// A backend with no services wired.
    pub fn uninitialized() -> Self {
        Self::default()
    }

    pub fn new(store: Arc<dyn DocumentStore>, objects: Arc<dyn ObjectStore>) -> Self {
        let backend = Self::default();
        let _ = backend.store.set(store);
        let _ = backend.objects.set(objects);
        backend
    }

    /// In-memory document and object stores.
    pub fn in_memory(public_base_url: impl Into<String>) -> Self {
        Self::new(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryObjectStore::new(public_base_url)),
        )
    }

    /// Wire the backends named by `config`: Postgres when a database URL is
    /// set, a local directory when a storage dir is set, memory otherwise.
    pub async fn from_config(config: &CatalogConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn DocumentStore> = match &config.database_url {
            Some(url) => {
                let store = PostgresDocumentStore::connect(url)
                    .await
                    .context("failed to connect to the document database")?;
                info!("document store: postgres");
                Arc::new(store)
            }
            None => {
                info!("document store: in-memory");
                Arc::new(InMemoryDocumentStore::new())
            }
        };

        let objects: Arc<dyn ObjectStore> = match &config.storage_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("failed to create storage directory {}", dir.display()))?;
                info!(dir = %dir.display(), "object storage: local directory");
                Arc::new(LocalDirObjectStore::new(dir, config.public_base_url.clone()))
            }
            None => {
                info!("object storage: in-memory");
                Arc::new(InMemoryObjectStore::new(config.public_base_url.clone()))
            }
        };

        Ok(Self::new(store, objects))
    }

    /// Wire the document store. Returns `false` if one was already wired.
    pub fn install_store(&self, store: Arc<dyn DocumentStore>) -> bool {
        self.store.set(store).is_ok()
    }

    /// Wire object storage. Returns `false` if it was already wired.
    pub fn install_objects(&self, objects: Arc<dyn ObjectStore>) -> bool {
        self.objects.set(objects).is_ok()
    }

    pub fn is_ready(&self) -> bool {
        self.store.get().is_some() && self.objects.get().is_some()
    }

    pub fn store(&self) -> Result<&Arc<dyn DocumentStore>, GatewayError> {
        self.store
            .get()
            .ok_or_else(|| GatewayError::not_initialized(DOCUMENT_STORE_SERVICE))
    }

    pub fn objects(&self) -> Result<&Arc<dyn ObjectStore>, GatewayError> {
        self.objects
            .get()
            .ok_or_else(|| GatewayError::not_initialized(OBJECT_STORE_SERVICE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninitialized_backend_reports_missing_service() {
        let backend = CatalogBackend::uninitialized();
        assert!(!backend.is_ready());
        assert!(matches!(
            backend.store(),
            Err(GatewayError::NotInitialized { service }) if service == DOCUMENT_STORE_SERVICE
        ));
        assert!(matches!(
            backend.objects(),
            Err(GatewayError::NotInitialized { service }) if service == OBJECT_STORE_SERVICE
        ));
    }

    #[tokio::test]
    async fn default_config_wires_in_memory_backends() {
        let backend = CatalogBackend::from_config(&CatalogConfig::default()).await.unwrap();
        assert!(backend.is_ready());
    }

    #[test]
    fn services_install_once() {
        let backend = CatalogBackend::uninitialized();
        assert!(backend.install_store(Arc::new(InMemoryDocumentStore::new())));
        assert!(!backend.install_store(Arc::new(InMemoryDocumentStore::new())));
        assert!(backend.store().is_ok());
        assert!(backend.objects().is_err());

        assert!(backend.install_objects(Arc::new(InMemoryObjectStore::default())));
        assert!(backend.is_ready());
    }
}
