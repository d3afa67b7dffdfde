//! HTTP application wiring (axum router + gateway wiring).
//!
//! - `services.rs`: backend and gateway construction
//! - `routes/`: HTTP routes and handlers (one file per area)
//! - `dto.rs`: query-string and request body types
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use aesthetica_infra::CatalogConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router from configuration (entrypoint used by `main.rs`).
pub async fn build_app(config: &CatalogConfig) -> anyhow::Result<Router> {
    let services = AppServices::from_config(config).await?;
    Ok(router(Arc::new(services)))
}

/// Router over already-wired services.
pub fn router(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
