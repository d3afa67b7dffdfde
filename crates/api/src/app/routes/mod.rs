use axum::{Router, routing::get};

pub mod brands;
pub mod catalog;
pub mod events;
pub mod files;
pub mod media;
pub mod product_stream;
pub mod products;
pub mod system;

/// Router for every catalog endpoint.
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .nest("/brands", brands::router())
        .nest("/events", events::router())
        .nest("/media", media::router())
        .route("/files/*path", get(files::serve_file))
}
