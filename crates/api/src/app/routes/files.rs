use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use aesthetica_infra::objects::{ObjectPath, ObjectStore, ObjectStoreError, guess_content_type};

use crate::app::errors;
use crate::app::services::AppServices;

/// GET /files/*path
///
/// Serves stored objects so the public URLs handed out on upload resolve
/// when no external object host is configured.
///
/// The response type comes from the file extension, never from what the
/// uploader declared, and the body is sandboxed so stored markup cannot run
/// on this origin.
pub async fn serve_file(
    Extension(services): Extension<Arc<AppServices>>,
    Path(path): Path<String>,
) -> Response {
    let path = match ObjectPath::parse(&path) {
        Ok(p) => p,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_path", e.to_string()),
    };
    let objects = match services.backend.objects() {
        Ok(o) => o,
        Err(e) => return errors::gateway_error_to_response(e),
    };

    match objects.get(&path).await {
        Ok(Some(blob)) => (
            [
                (header::CONTENT_TYPE, guess_content_type(path.file_name())),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
                (header::CONTENT_SECURITY_POLICY, "sandbox"),
            ],
            blob.bytes,
        )
            .into_response(),
        Ok(None) | Err(ObjectStoreError::NotFound(_)) => errors::not_found("file"),
        Err(e) => {
            tracing::error!(path = %path, error = %e, "failed to read object");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "operation_failed",
                "failed to read file",
            )
        }
    }
}
