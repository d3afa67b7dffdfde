use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use aesthetica_core::DomainError;
use aesthetica_infra::GatewayError;

pub fn gateway_error_to_response(err: GatewayError) -> axum::response::Response {
    if err.is_not_found() {
        return json_error(StatusCode::NOT_FOUND, "not_found", "not found");
    }
    match err {
        GatewayError::NotInitialized { .. } => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "not_initialized", err.to_string())
        }
        GatewayError::Operation { .. } => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "operation_failed", err.to_string())
        }
        GatewayError::Bulk { .. } => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "bulk_failed", err.to_string())
        }
        GatewayError::Domain(e) => domain_error_to_response(e),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

pub fn not_found(what: &str) -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
