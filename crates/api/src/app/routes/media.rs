use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};

use aesthetica_content::MediaAsset;
use aesthetica_core::MediaId;

use crate::app::dto::{self, parse_id};
use crate::app::errors;
use crate::app::routes::{catalog, products::file_upload};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_media)
                .post(upload_media)
                .layer(DefaultBodyLimit::max(dto::MAX_UPLOAD_BYTES)),
        )
        .route(
            "/:id",
            get(catalog::get_one::<MediaAsset>)
                .patch(catalog::update::<MediaAsset>)
                .delete(delete_media),
        )
}

/// GET /media, optionally `?folder=`.
pub async fn list_media(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::FolderParams>,
) -> Response {
    let result = match params.folder.as_deref() {
        Some(folder) => services.media.get_media_by_folder(folder).await,
        None => services.media.collection().list().await,
    };
    match result {
        Ok(assets) => Json(assets).into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

/// POST /media?fileName=&folder=&alt=
///
/// The request body is the raw file.
pub async fn upload_media(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::MediaUploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let upload = file_upload(params.file_name, &headers, body);
    match services
        .media
        .upload_media(upload, params.folder.as_deref(), params.alt)
        .await
    {
        Ok(asset) => (StatusCode::CREATED, Json(asset)).into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

/// DELETE /media/:id removes the stored file and the record.
pub async fn delete_media(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id: MediaId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.media.delete_media(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}
