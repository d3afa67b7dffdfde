use std::sync::Arc;

use aesthetica_infra::{
    BrandGateway, CatalogBackend, CatalogConfig, EventGateway, MediaGateway, ProductGateway,
};

/// Gateways shared by every handler.
#[derive(Debug)]
pub struct AppServices {
    pub backend: Arc<CatalogBackend>,
    pub products: ProductGateway,
    pub brands: BrandGateway,
    pub events: EventGateway,
    pub media: MediaGateway,
}

impl AppServices {
    pub fn new(backend: Arc<CatalogBackend>, config: &CatalogConfig) -> Self {
        Self {
            products: ProductGateway::from_config(backend.clone(), config),
            brands: BrandGateway::new(backend.clone()),
            events: EventGateway::new(backend.clone()),
            media: MediaGateway::new(backend.clone()),
            backend,
        }
    }

    /// Connect the backends named by `config` and build the gateways on them.
    pub async fn from_config(config: &CatalogConfig) -> anyhow::Result<Self> {
        let backend = CatalogBackend::from_config(config).await?;
        tracing::info!(
            cache_ttl_secs = config.cache_ttl.as_secs(),
            cache_policy = %config.cache_policy,
            "catalog services ready"
        );
        Ok(Self::new(Arc::new(backend), config))
    }
}
