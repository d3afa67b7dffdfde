use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;

use aesthetica_content::TrainingEvent;
use aesthetica_core::EventId;

use crate::app::dto::parse_id;
use crate::app::errors;
use crate::app::routes::catalog;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(catalog::list::<TrainingEvent>).post(catalog::create::<TrainingEvent>),
        )
        .route("/upcoming", get(upcoming_events))
        .route("/slug/:slug", get(catalog::by_slug::<TrainingEvent>))
        .route("/:id", catalog::item::<TrainingEvent>())
        .route("/:id/register", post(register_attendee))
}

pub async fn upcoming_events(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.events.get_upcoming_events(Utc::now()).await {
        Ok(events) => Json(events).into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}

/// POST /events/:id/register
///
/// Returns the updated event; 409 when the event is full, 400 when it is
/// inactive or has already started.
pub async fn register_attendee(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id: EventId = match parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.events.register_attendee(&id, Utc::now()).await {
        Ok(event) => Json(event).into_response(),
        Err(e) => errors::gateway_error_to_response(e),
    }
}
