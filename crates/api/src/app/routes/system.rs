use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode};

use crate::app::services::AppServices;

/// 200 once both backends are wired, 503 otherwise.
pub async fn health(Extension(services): Extension<Arc<AppServices>>) -> StatusCode {
    if services.backend.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
