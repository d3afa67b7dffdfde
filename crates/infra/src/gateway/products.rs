//! Product catalog gateway.
//!
//! ## Listing cache
//!
//! `get_all_products` serves the full listing from a [`ListingCache`] while it
//! is younger than the TTL. Under [`CachePolicy::Legacy`] writes made through
//! this gateway do not clear it, so the cached listing can lag a mutation by
//! up to one TTL. [`CachePolicy::InvalidateOnWrite`] clears it after every
//! successful write. Every other read goes to the store.
//!
//! The cache is per gateway instance; separate processes keep separate
//! caches.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use aesthetica_core::{DocumentId, ProductId};
use aesthetica_products::{
    ALL_PRODUCTS_SLUG, Product, ProductFields, ProductFilters, ProductPatch, ProductStats,
    SearchTerm, DEFAULT_LOW_STOCK_THRESHOLD,
};

use crate::backend::CatalogBackend;
use crate::cache::{CachePolicy, DEFAULT_CACHE_TTL, ListingCache};
use crate::config::CatalogConfig;
use crate::objects::{FileUpload, ObjectPath, ObjectStoreError};
use crate::store::{CREATED_AT_FIELD, Direction, Document, DocumentStore, FilterOp, Query, StoreError};

use super::subscription::{ProductSubscription, spawn_live_query};
use super::{BackendError, CollectionGateway, GatewayError, GatewayResult, to_document};

const COLLECTION: &str = "products";

/// Build the store query for a live listing: one equality filter per set
/// field, newest first.
pub fn filters_to_query(filters: &ProductFilters) -> Query {
    let mut query = Query::new();
    if let Some(category) = &filters.category {
        query = query.where_eq("category", category.as_str());
    }
    if let Some(is_active) = filters.is_active {
        query = query.where_eq("isActive", is_active);
    }
    if let Some(featured) = filters.featured {
        query = query.where_eq("featured", featured);
    }
    if let Some(best_seller) = filters.best_seller {
        query = query.where_eq("bestSeller", best_seller);
    }
    if let Some(new_arrival) = filters.new_arrival {
        query = query.where_eq("newArrival", new_arrival);
    }
    query.order_by(CREATED_AT_FIELD, Direction::Desc)
}

fn active_flag_query(flag: &str, limit: usize) -> Query {
    Query::new()
        .where_eq(flag, true)
        .where_eq("isActive", true)
        .order_by(CREATED_AT_FIELD, Direction::Desc)
        .limit(limit)
}

pub struct ProductGateway {
    products: CollectionGateway<Product>,
    cache: ListingCache<Product>,
    policy: CachePolicy,
    low_stock_threshold: i64,
}

impl std::fmt::Debug for ProductGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductGateway")
            .field("cache_ttl", &self.cache.ttl())
            .field("policy", &self.policy)
            .field("low_stock_threshold", &self.low_stock_threshold)
            .finish()
    }
}

impl ProductGateway {
    /// Five-minute listing cache, legacy policy.
    pub fn new(backend: Arc<CatalogBackend>) -> Self {
        Self::with_cache(backend, DEFAULT_CACHE_TTL, CachePolicy::default())
    }

    pub fn with_cache(backend: Arc<CatalogBackend>, ttl: Duration, policy: CachePolicy) -> Self {
        Self {
            products: CollectionGateway::new(backend),
            cache: ListingCache::new(ttl),
            policy,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }

    pub fn from_config(backend: Arc<CatalogBackend>, config: &CatalogConfig) -> Self {
        Self::with_cache(backend, config.cache_ttl, config.cache_policy)
            .with_low_stock_threshold(config.low_stock_threshold)
    }

    pub fn with_low_stock_threshold(mut self, threshold: i64) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    pub fn cache_policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn low_stock_threshold(&self) -> i64 {
        self.low_stock_threshold
    }

    pub fn backend(&self) -> &Arc<CatalogBackend> {
        self.products.backend()
    }

    /// Drop the cached listing regardless of policy.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate();
    }

    fn after_write(&self) {
        if self.policy.invalidates_on_write() {
            debug!("product listing cache invalidated after write");
            self.cache.invalidate();
        }
    }

    /// Every product, served from the listing cache while it is fresh.
    pub async fn get_all_products(&self) -> GatewayResult<Arc<Vec<Product>>> {
        self.products.store()?;

        let ticket = self.cache.ticket();
        if let Some(cached) = self.cache.get() {
            debug!(count = cached.len(), "product listing served from cache");
            return Ok(cached);
        }

        debug!("product listing cache miss");
        let fresh = self
            .products
            .query(&Query::new(), "failed to fetch products")
            .await?;
        Ok(self.cache.store(ticket, fresh))
    }

    /// Every product, newest first, straight from the store.
    ///
    /// Overlaps with [`get_all_products`](Self::get_all_products); kept for
    /// callers that need ordering or cannot tolerate staleness.
    pub async fn get_products(&self) -> GatewayResult<Vec<Product>> {
        self.products.list().await
    }

    pub async fn get_product(&self, id: &ProductId) -> GatewayResult<Option<Product>> {
        self.products.get(id).await
    }

    /// First product whose slug matches. `"all"` is reserved for listing
    /// routes and always yields `None` without touching the store.
    pub async fn get_product_by_slug(&self, slug: &str) -> GatewayResult<Option<Product>> {
        if slug == ALL_PRODUCTS_SLUG {
            return Ok(None);
        }
        self.products.get_by_slug(slug).await
    }

    pub async fn add_product(&self, fields: &ProductFields) -> GatewayResult<ProductId> {
        let id = self.products.add(fields).await?;
        self.after_write();
        Ok(id)
    }

    pub async fn update_product(&self, id: &ProductId, patch: &ProductPatch) -> GatewayResult<()> {
        self.products.update(id, patch).await?;
        self.after_write();
        Ok(())
    }

    pub async fn delete_product(&self, id: &ProductId) -> GatewayResult<()> {
        self.products.delete(id).await?;
        self.after_write();
        Ok(())
    }

    /// Store an image under `products/<id>/<file>` and return its public URL.
    ///
    /// The product document is not touched; callers add the URL to `images`
    /// with a separate update.
    pub async fn upload_product_image(
        &self,
        upload: FileUpload,
        product_id: &ProductId,
    ) -> GatewayResult<String> {
        const FAILED: &str = "failed to upload product image";
        let objects = self.backend().objects()?;

        let path = ObjectPath::product_image(product_id, &upload.file_name)
            .map_err(|e| GatewayError::operation(FAILED, e))?;
        let stored = objects
            .put(&path, upload)
            .await
            .map_err(|e| GatewayError::operation(FAILED, e))?;

        info!(product_id = %product_id, path = %stored.path, size = stored.size, "product image uploaded");
        Ok(stored.url)
    }

    /// Delete the object a public image URL points at.
    pub async fn delete_product_image(&self, url: &str) -> GatewayResult<()> {
        const FAILED: &str = "failed to delete product image";
        let objects = self.backend().objects()?;

        let path = objects.path_for_url(url).ok_or_else(|| {
            GatewayError::operation(FAILED, ObjectStoreError::InvalidPath(url.to_string()))
        })?;
        objects
            .delete(&path)
            .await
            .map_err(|e| GatewayError::operation(FAILED, e))?;

        info!(path = %path, "product image deleted");
        Ok(())
    }

    /// Active products in `category`, newest first.
    pub async fn get_products_by_category(&self, category: &str) -> GatewayResult<Vec<Product>> {
        let query = Query::new()
            .where_eq("category", category)
            .where_eq("isActive", true)
            .order_by(CREATED_AT_FIELD, Direction::Desc);
        self.products
            .query(&query, "failed to fetch products by category")
            .await
    }

    pub async fn get_featured_products(&self, limit: usize) -> GatewayResult<Vec<Product>> {
        self.products
            .query(&active_flag_query("featured", limit), "failed to fetch featured products")
            .await
    }

    pub async fn get_best_sellers(&self, limit: usize) -> GatewayResult<Vec<Product>> {
        self.products
            .query(&active_flag_query("bestSeller", limit), "failed to fetch best sellers")
            .await
    }

    pub async fn get_new_arrivals(&self, limit: usize) -> GatewayResult<Vec<Product>> {
        self.products
            .query(&active_flag_query("newArrival", limit), "failed to fetch new arrivals")
            .await
    }

    /// Products with `stock <= threshold`, lowest stock first. Inactive
    /// products are included. `None` uses the configured threshold.
    pub async fn get_low_stock_products(&self, threshold: Option<i64>) -> GatewayResult<Vec<Product>> {
        let threshold = threshold.unwrap_or(self.low_stock_threshold);
        let query = Query::new()
            .filter("stock", FilterOp::Le, threshold)
            .order_by("stock", Direction::Asc);
        self.products
            .query(&query, "failed to fetch low stock products")
            .await
    }

    /// Active products whose name, description, category, sku or tags
    /// contain `term`, case-insensitively. An empty term returns every active
    /// product.
    pub async fn search_products(&self, term: &str) -> GatewayResult<Vec<Product>> {
        let term = SearchTerm::new(term);
        let active = self
            .products
            .query(&Query::new().where_eq("isActive", true), "failed to search products")
            .await?;
        let hits: Vec<Product> = active
            .into_iter()
            .filter(|p| term.matches(&p.fields))
            .collect();
        debug!(term = term.as_str(), hits = hits.len(), "product search");
        Ok(hits)
    }

    /// Apply `patch` to every id concurrently.
    ///
    /// All requests run to completion. If any fail the call returns
    /// [`GatewayError::Bulk`]; the requests that succeeded stay applied.
    pub async fn bulk_update_products(&self, ids: &[ProductId], patch: &ProductPatch) -> GatewayResult<()> {
        const FAILED: &str = "failed to update products";
        let store = self.products.store()?;
        let body = to_document(patch).map_err(|e| GatewayError::operation(FAILED, e))?;

        let outcome = fan_out(store, ids, move |store, id| {
            let body: Document = body.clone();
            async move { store.merge(COLLECTION, &id, body).await.map(|_| ()) }
        })
        .await;
        self.finish_bulk(FAILED, ids.len(), outcome)
    }

    /// Delete every id concurrently. Same failure contract as
    /// [`bulk_update_products`](Self::bulk_update_products).
    pub async fn bulk_delete_products(&self, ids: &[ProductId]) -> GatewayResult<()> {
        const FAILED: &str = "failed to delete products";
        let store = self.products.store()?;

        let outcome = fan_out(store, ids, |store, id| async move {
            store.delete(COLLECTION, &id).await
        })
        .await;
        self.finish_bulk(FAILED, ids.len(), outcome)
    }

    fn finish_bulk(&self, message: &str, total: usize, failures: Vec<BackendError>) -> GatewayResult<()> {
        if failures.len() < total {
            self.after_write();
        }
        let failed = failures.len();
        let Some(first) = failures.into_iter().next() else {
            info!(total, "bulk product operation applied");
            return Ok(());
        };

        error!(failed, total, error = %first, "{message}");
        Err(GatewayError::Bulk {
            message: message.to_string(),
            failed,
            total,
            first,
        })
    }

    /// Watch products matching `filters`.
    ///
    /// `callback` receives the full matching set (newest first) once the
    /// subscription starts and again after every change to the collection.
    /// Must be called from within a Tokio runtime.
    pub fn subscribe_to_products<F>(&self, filters: &ProductFilters, callback: F) -> GatewayResult<ProductSubscription>
    where
        F: FnMut(Vec<Product>) + Send + 'static,
    {
        let store = Arc::clone(self.products.store()?);
        spawn_live_query::<Product, F>(store, filters_to_query(filters), callback)
    }

    /// Aggregate counts over the whole collection, recomputed per call.
    pub async fn get_product_stats(&self) -> GatewayResult<ProductStats> {
        let all = self
            .products
            .query(&Query::new(), "failed to fetch product stats")
            .await?;
        Ok(ProductStats::from_products(
            all.iter().map(|p| &p.fields),
            self.low_stock_threshold,
        ))
    }

    /// True when no product other than `exclude` uses `slug`. `"all"` is
    /// never available.
    pub async fn is_slug_available(&self, slug: &str, exclude: Option<&ProductId>) -> GatewayResult<bool> {
        if slug == ALL_PRODUCTS_SLUG || slug.is_empty() {
            return Ok(false);
        }
        let all = self
            .products
            .query(&Query::new(), "failed to check product slug")
            .await?;
        Ok(!all
            .iter()
            .any(|p| p.fields.slug == slug && Some(&p.id) != exclude))
    }

    pub fn slugify(name: &str) -> String {
        aesthetica_products::slugify(name)
    }
}

/// One task per id; wait for all, collect failures.
async fn fan_out<F, Fut>(store: &Arc<dyn DocumentStore>, ids: &[ProductId], op: F) -> Vec<BackendError>
where
    F: Fn(Arc<dyn DocumentStore>, DocumentId) -> Fut,
    Fut: std::future::Future<Output = Result<(), StoreError>> + Send + 'static,
{
    let mut tasks = JoinSet::new();
    for id in ids {
        tasks.spawn(op(Arc::clone(store), id.clone().into()));
    }

    let mut failures = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => failures.push(BackendError::Store(e)),
            Err(e) => failures.push(BackendError::Task(e.to_string())),
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_translate_to_equality_constraints() {
        let query = filters_to_query(&ProductFilters {
            category: Some("serums".to_string()),
            featured: Some(true),
            ..ProductFilters::default()
        });
        let fields: Vec<_> = query.filters.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(fields, vec!["category", "featured"]);
        assert!(query.filters.iter().all(|f| f.op == FilterOp::Eq));
        assert_eq!(
            query.order_by.map(|o| (o.field, o.direction)),
            Some((CREATED_AT_FIELD.to_string(), Direction::Desc))
        );
    }

    #[test]
    fn flag_queries_require_active_and_limit() {
        let query = active_flag_query("bestSeller", 4);
        assert_eq!(query.limit, Some(4));
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.filters[1].field, "isActive");
    }

    #[test]
    fn slugify_is_exposed_for_admin_forms() {
        assert_eq!(ProductGateway::slugify("Hydra Glow Serum"), "hydra-glow-serum");
    }
}
