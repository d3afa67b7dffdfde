//! Generic handlers for the collections that only need plain CRUD.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{MethodRouter, get},
};

use aesthetica_content::{Brand, MediaAsset, TrainingEvent};
use aesthetica_core::CatalogEntity;
use aesthetica_infra::CollectionGateway;

use crate::app::dto::{self, parse_id};
use crate::app::errors;
use crate::app::services::AppServices;

/// A collection served through the generic handlers.
pub trait CatalogResource: CatalogEntity {
    fn gateway(services: &AppServices) -> &CollectionGateway<Self>;
}

impl CatalogResource for Brand {
    fn gateway(services: &AppServices) -> &CollectionGateway<Self> {
        services.brands.collection()
    }
}

impl CatalogResource for TrainingEvent {
    fn gateway(services: &AppServices) -> &CollectionGateway<Self> {
        services.events.collection()
    }
}

impl CatalogResource for MediaAsset {
    fn gateway(services: &AppServices) -> &CollectionGateway<Self> {
        services.media.collection()
    }
}

/// GET, PATCH and DELETE on `/:id`.
pub fn item<T: CatalogResource>() -> MethodRouter {
    get(get_one::<T>).patch(update::<T>).delete(remove::<T>)
}

pub async fn list<T: CatalogResource>(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match T::gateway(&services).list().await {
        Ok(items) => Json(items).into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub async fn create<T: CatalogResource>(
    Extension(services): Extension<Arc<AppServices>>,
    Json(fields): Json<T::Fields>,
) -> Response {
    match T::gateway(&services).add(&fields).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(dto::CreatedResponse { id: id.to_string() }),
        )
            .into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub async fn by_slug<T: CatalogResource>(
    Extension(services): Extension<Arc<AppServices>>,
    Path(slug): Path<String>,
) -> Response {
    match T::gateway(&services).get_by_slug(&slug).await {
        Ok(Some(item)) => Json(item).into_response(),
        Ok(None) => errors::not_found(T::LABEL),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub async fn get_one<T: CatalogResource>(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id: T::Id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match T::gateway(&services).get(&id).await {
        Ok(Some(item)) => Json(item).into_response(),
        Ok(None) => errors::not_found(T::LABEL),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub async fn update<T: CatalogResource>(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(patch): Json<T::Patch>,
) -> Response {
    let id: T::Id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match T::gateway(&services).update(&id, &patch).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

pub async fn remove<T: CatalogResource>(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id: T::Id = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match T::gateway(&services).delete(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}
