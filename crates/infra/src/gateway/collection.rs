use std::marker::PhantomData;
use std::sync::Arc;

use tracing::{debug, info};

use aesthetica_core::{CatalogEntity, DocumentId};

use crate::backend::CatalogBackend;
use crate::store::{CREATED_AT_FIELD, Direction, DocumentStore, Query};

use super::{GatewayError, GatewayResult, decode, decode_all, to_document};

/// CRUD over one collection of `T`.
///
/// The product, brand, event and media gateways are built on this; it also
/// works on its own for any [`CatalogEntity`].
pub struct CollectionGateway<T> {
    backend: Arc<CatalogBackend>,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for CollectionGateway<T> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            _entity: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for CollectionGateway<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionGateway")
            .field("collection", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: CatalogEntity> CollectionGateway<T> {
    pub fn new(backend: Arc<CatalogBackend>) -> Self {
        Self {
            backend,
            _entity: PhantomData,
        }
    }

    pub fn backend(&self) -> &Arc<CatalogBackend> {
        &self.backend
    }

    pub(crate) fn store(&self) -> GatewayResult<&Arc<dyn DocumentStore>> {
        self.backend.store()
    }

    /// Point lookup. Absent is `Ok(None)`.
    pub async fn get(&self, id: &T::Id) -> GatewayResult<Option<T>> {
        let store = self.store()?;
        let doc_id: DocumentId = id.clone().into();
        let fetch_failed = || format!("failed to fetch {}", T::LABEL);

        let doc = store
            .get(T::COLLECTION, &doc_id)
            .await
            .map_err(|e| GatewayError::operation(fetch_failed(), e))?;

        doc.map(decode)
            .transpose()
            .map_err(|e| GatewayError::operation(fetch_failed(), e))
    }

    /// Run `query` against the collection; `failure` is the message used if
    /// the store call fails.
    pub async fn query(&self, query: &Query, failure: &str) -> GatewayResult<Vec<T>> {
        let store = self.store()?;
        let docs = store
            .query(T::COLLECTION, query)
            .await
            .map_err(|e| GatewayError::operation(failure, e))?;
        debug!(collection = T::COLLECTION, count = docs.len(), "query returned");
        Ok(decode_all(T::COLLECTION, docs))
    }

    /// Every document, newest first.
    pub async fn list(&self) -> GatewayResult<Vec<T>> {
        self.query(
            &Query::new().order_by(CREATED_AT_FIELD, Direction::Desc),
            &format!("failed to fetch {}s", T::LABEL),
        )
        .await
    }

    /// Full fetch, then the first entity whose slug matches.
    ///
    /// Slugs are not unique; with duplicates the most recently created one
    /// wins.
    pub async fn get_by_slug(&self, slug: &str) -> GatewayResult<Option<T>> {
        let all = self
            .query(
                &Query::new().order_by(CREATED_AT_FIELD, Direction::Desc),
                &format!("failed to fetch {} by slug", T::LABEL),
            )
            .await?;
        Ok(all.into_iter().find(|entity| entity.slug() == Some(slug)))
    }

    pub async fn add(&self, fields: &T::Fields) -> GatewayResult<T::Id> {
        let store = self.store()?;
        let add_failed = || format!("failed to add {}", T::LABEL);

        let body = to_document(fields).map_err(|e| GatewayError::operation(add_failed(), e))?;
        let stored = store
            .insert(T::COLLECTION, body)
            .await
            .map_err(|e| GatewayError::operation(add_failed(), e))?;

        info!(collection = T::COLLECTION, id = %stored.id, "document created");
        Ok(T::Id::from(stored.id))
    }

    /// Merge `patch` into the stored document. No existence check is made
    /// first; a missing id surfaces as the store's not-found failure.
    pub async fn update(&self, id: &T::Id, patch: &T::Patch) -> GatewayResult<()> {
        let store = self.store()?;
        let update_failed = || format!("failed to update {}", T::LABEL);
        let doc_id: DocumentId = id.clone().into();

        let body = to_document(patch).map_err(|e| GatewayError::operation(update_failed(), e))?;
        store
            .merge(T::COLLECTION, &doc_id, body)
            .await
            .map_err(|e| GatewayError::operation(update_failed(), e))?;

        info!(collection = T::COLLECTION, id = %doc_id, "document updated");
        Ok(())
    }

    pub async fn delete(&self, id: &T::Id) -> GatewayResult<()> {
        let store = self.store()?;
        let doc_id: DocumentId = id.clone().into();

        store
            .delete(T::COLLECTION, &doc_id)
            .await
            .map_err(|e| GatewayError::operation(format!("failed to delete {}", T::LABEL), e))?;

        info!(collection = T::COLLECTION, id = %doc_id, "document deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aesthetica_content::{Brand, BrandFields, BrandPatch};

    use crate::store::{InMemoryDocumentStore, StoreOperation};
    use crate::objects::InMemoryObjectStore;

    fn gateway() -> (Arc<InMemoryDocumentStore>, CollectionGateway<Brand>) {
        let store = Arc::new(InMemoryDocumentStore::new());
        let backend = CatalogBackend::new(store.clone(), Arc::new(InMemoryObjectStore::default()));
        (store, CollectionGateway::new(Arc::new(backend)))
    }

    fn brand(name: &str, slug: &str) -> BrandFields {
        BrandFields {
            name: name.to_string(),
            slug: slug.to_string(),
            is_active: true,
            ..BrandFields::default()
        }
    }

    #[tokio::test]
    async fn add_then_get_round_trips_fields() {
        let (_, brands) = gateway();
        let fields = brand("Dermaheal", "dermaheal");
        let id = brands.add(&fields).await.unwrap();

        let stored = brands.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.fields, fields);
        assert_eq!(stored.timestamps.created_at, stored.timestamps.updated_at);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_slug_lookup_scans() {
        let (_, brands) = gateway();
        brands.add(&brand("First", "first")).await.unwrap();
        let second = brands.add(&brand("Second", "second")).await.unwrap();

        let all = brands.list().await.unwrap();
        assert_eq!(all[0].id, second);
        assert_eq!(all.len(), 2);

        let found = brands.get_by_slug("first").await.unwrap().unwrap();
        assert_eq!(found.fields.name, "First");
        assert!(brands.get_by_slug("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_and_delete_missing_documents_fail_as_not_found() {
        let (_, brands) = gateway();
        let ghost = aesthetica_core::BrandId::new(DocumentId::generate());

        let err = brands
            .update(&ghost, &BrandPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to update brand");
        assert!(err.is_not_found());

        assert!(brands.delete(&ghost).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn backend_failures_use_fixed_messages() {
        let (store, brands) = gateway();
        store.fail_operation(StoreOperation::Query);
        let err = brands.list().await.unwrap_err();
        assert_eq!(err.to_string(), "failed to fetch brands");
    }
}
