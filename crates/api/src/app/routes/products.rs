use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Extension, Path, Query},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};

use aesthetica_core::ProductId;
use aesthetica_infra::objects::FileUpload;
use aesthetica_products::{ProductFields, ProductPatch};

use crate::app::dto::{self, parse_id, parse_ids};
use crate::app::errors;
use crate::app::routes::product_stream;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/search", get(search_products))
        .route("/stats", get(product_stats))
        .route("/featured", get(featured_products))
        .route("/best-sellers", get(best_sellers))
        .route("/new-arrivals", get(new_arrivals))
        .route("/low-stock", get(low_stock_products))
        .route("/stream", get(product_stream::stream_products))
        .route("/category/:category", get(products_by_category))
        .route("/slug/:slug", get(product_by_slug))
        .route("/bulk/update", post(bulk_update_products))
        .route("/bulk/delete", post(bulk_delete_products))
        .route("/images", delete(delete_product_image))
        .route(
            "/:id",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route(
            "/:id/images",
            post(upload_product_image).layer(DefaultBodyLimit::max(dto::MAX_UPLOAD_BYTES)),
        )
}

/// GET /products
///
/// The cached listing, or a fresh read with `?fresh=true`.
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::ListParams>,
) -> Response {
    if params.fresh {
        return match services.products.get_products().await {
            Ok(products) => Json(products).into_response(),
            Err(e) => errors::gateway_error_to_response(e),
        };
    }
    match services.products.get_all_products().await {
        Ok(products) => Json(products.as_slice()).into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<ProductFields>,
) -> Response {
    match services.products.add_product(&body).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(dto::CreatedResponse { id: id.to_string() }),
        )
            .into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id: ProductId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.products.get_product(&id).await {
        Ok(Some(product)) => Json(product).into_response(),
        Ok(None) => errors::not_found("product"),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub async fn product_by_slug(
    Extension(services): Extension<Arc<AppServices>>,
    Path(slug): Path<String>,
) -> Response {
    match services.products.get_product_by_slug(&slug).await {
        Ok(Some(product)) => Json(product).into_response(),
        Ok(None) => errors::not_found("product"),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(patch): Json<ProductPatch>,
) -> Response {
    let id: ProductId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.products.update_product(&id, &patch).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id: ProductId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.products.delete_product(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub async fn search_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::SearchParams>,
) -> Response {
    match services.products.search_products(&params.q).await {
        Ok(products) => Json(products).into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub async fn product_stats(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.products.get_product_stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub async fn featured_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::LimitParams>,
) -> Response {
    match services.products.get_featured_products(params.limit()).await {
        Ok(products) => Json(products).into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub async fn best_sellers(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::LimitParams>,
) -> Response {
    match services.products.get_best_sellers(params.limit()).await {
        Ok(products) => Json(products).into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub async fn new_arrivals(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::LimitParams>,
) -> Response {
    match services.products.get_new_arrivals(params.limit()).await {
        Ok(products) => Json(products).into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub async fn low_stock_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::ThresholdParams>,
) -> Response {
    match services.products.get_low_stock_products(params.threshold).await {
        Ok(products) => Json(products).into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub async fn products_by_category(
    Extension(services): Extension<Arc<AppServices>>,
    Path(category): Path<String>,
) -> Response {
    match services.products.get_products_by_category(&category).await {
        Ok(products) => Json(products).into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

/// POST /products/bulk/update
///
/// On partial failure some products may already carry the patch.
pub async fn bulk_update_products(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::BulkUpdateRequest>,
) -> Response {
    let ids: Vec<ProductId> = match parse_ids(&body.ids) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.products.bulk_update_products(&ids, &body.patch).await {
        Ok(()) => Json(dto::BulkResponse {
            processed: ids.len(),
        })
        .into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub async fn bulk_delete_products(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::BulkDeleteRequest>,
) -> Response {
    let ids: Vec<ProductId> = match parse_ids(&body.ids) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.products.bulk_delete_products(&ids).await {
        Ok(()) => Json(dto::BulkResponse {
            processed: ids.len(),
        })
        .into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

/// POST /products/:id/images?fileName=
///
/// The request body is the raw file. Its `Content-Type` is kept unless it is
/// missing or generic, in which case it is guessed from the file name.
pub async fn upload_product_image(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(params): Query<dto::ImageUploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let id: ProductId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let upload = file_upload(params.file_name, &headers, body);
    match services.products.upload_product_image(upload, &id).await {
        Ok(url) => (StatusCode::CREATED, Json(dto::UploadedResponse { url })).into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub async fn delete_product_image(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::ImageUrlParams>,
) -> Response {
    match services.products.delete_product_image(&params.url).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

/// Build an upload from a raw request body.
pub(crate) fn file_upload(file_name: String, headers: &HeaderMap, body: Bytes) -> FileUpload {
    let upload = FileUpload::new(file_name, body.to_vec());
    let declared = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream");
    match declared {
        Some(ct) => upload.with_content_type(ct),
        None => upload,
    }
}
