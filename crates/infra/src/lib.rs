//! Infrastructure layer: document store, object storage, listing cache,
//! configuration and the catalog gateways built on them.

pub mod backend;
pub mod cache;
pub mod config;
pub mod gateway;
pub mod objects;
pub mod store;


pub use backend::CatalogBackend;
pub use cache::{CacheTicket, CachePolicy, DEFAULT_CACHE_TTL, ListingCache};
pub use config::{CatalogConfig, ConfigError};
pub use gateway::{
    BackendError, BrandGateway, CollectionGateway, EventGateway, GatewayError, GatewayResult,
    LiveQuery, MediaGateway, ProductGateway, ProductSubscription,
};
