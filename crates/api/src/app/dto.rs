use serde::{Deserialize, Serialize};

use aesthetica_core::DocumentId;
use aesthetica_products::ProductPatch;

use crate::app::errors;

/// Row count for the storefront sections when `?limit=` is absent.
pub const DEFAULT_SECTION_LIMIT: usize = 8;

/// Body cap for raw file uploads (product photos, media library videos).
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

// -------------------------
// Query strings
// -------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// Bypass the listing cache.
    pub fresh: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub q: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

impl LimitParams {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_SECTION_LIMIT)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ThresholdParams {
    pub threshold: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadParams {
    pub file_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageUrlParams {
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUploadParams {
    pub file_name: String,
    pub folder: Option<String>,
    pub alt: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FolderParams {
    pub folder: Option<String>,
}

// -------------------------
// Request bodies
// -------------------------

/// Ids arrive as raw strings and go through [`parse_ids`].
#[derive(Debug, Deserialize)]
pub struct BulkUpdateRequest {
    pub ids: Vec<String>,
    pub patch: ProductPatch,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<String>,
}

// -------------------------
// Responses
// -------------------------

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct UploadedResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct BulkResponse {
    pub processed: usize,
}

/// Parse a path segment into a typed document id.
pub fn parse_id<I: From<DocumentId>>(raw: &str) -> Result<I, axum::response::Response> {
    raw.parse::<DocumentId>()
        .map(I::from)
        .map_err(errors::domain_error_to_response)
}

/// Parse every id of a bulk request; the first bad one rejects the request.
pub fn parse_ids<I: From<DocumentId>>(raw: &[String]) -> Result<Vec<I>, axum::response::Response> {
    raw.iter().map(|id| parse_id(id)).collect()
}
