use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    response::{IntoResponse, Response},
    routing::get,
};

use aesthetica_content::Brand;

use crate::app::errors;
use crate::app::routes::catalog;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(catalog::list::<Brand>).post(catalog::create::<Brand>))
        .route("/active", get(active_brands))
        .route("/slug/:slug", get(catalog::by_slug::<Brand>))
        .route("/:id", catalog::item::<Brand>())
}

pub async fn active_brands(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.brands.get_active_brands().await {
        Ok(brands) => Json(brands).into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}
