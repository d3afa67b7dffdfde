//! Object storage boundary (image and media files).
//!
//! Objects are addressed by slash-separated [`ObjectPath`]s and exposed under a
//! public base URL. The URL -> path mapping is the inverse of
//! [`ObjectStore::public_url`], which is how an image is deleted given only the
//! URL stored on a product.

pub mod in_memory;
pub mod local_dir;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use aesthetica_core::ProductId;

pub use in_memory::InMemoryObjectStore;
pub use local_dir::LocalDirObjectStore;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectStoreError {
    #[error("invalid object path: {0}")]
    InvalidPath(String),

    #[error("object {0} not found")]
    NotFound(String),

    #[error("object storage error: {0}")]
    Backend(String),
}

/// Validated object key, e.g. `products/0190.../serum.png`.
///
/// Segments are non-empty, never `.` or `..`, and contain no backslashes, so a
/// path can be joined onto a directory without escaping it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectPath(String);

impl ObjectPath {
    pub fn parse(raw: &str) -> Result<Self, ObjectStoreError> {
        if raw.is_empty() {
            return Err(ObjectStoreError::InvalidPath("path is empty".to_string()));
        }
        for segment in raw.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                return Err(ObjectStoreError::InvalidPath(raw.to_string()));
            }
        }
        Ok(Self(raw.to_string()))
    }

    /// `products/<productId>/<fileName>`
    pub fn product_image(product_id: &ProductId, file_name: &str) -> Result<Self, ObjectStoreError> {
        Self::parse(&format!(
            "products/{}/{}",
            product_id.as_str(),
            sanitize_file_name(file_name)?
        ))
    }

    /// `media/<folder>/<fileName>`
    pub fn media(folder: &str, file_name: &str) -> Result<Self, ObjectStoreError> {
        Self::parse(&format!(
            "media/{}/{}",
            sanitize_file_name(folder)?,
            sanitize_file_name(file_name)?
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reduce a client-supplied name to `[A-Za-z0-9._-]`.
pub fn sanitize_file_name(name: &str) -> Result<String, ObjectStoreError> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name).trim();
    let cleaned: String = base
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        return Err(ObjectStoreError::InvalidPath(format!(
            "unusable file name '{name}'"
        )));
    }
    Ok(cleaned)
}

/// Content type from a file extension; unknown types are octet streams.
pub fn guess_content_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "pdf" => "application/pdf",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// A file handed to the gateway for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Declared content type, else one guessed from the file name.
    pub fn resolved_content_type(&self) -> String {
        self.content_type
            .clone()
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| guess_content_type(&self.file_name).to_string())
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub path: ObjectPath,
    pub url: String,
    pub size: u64,
    pub content_type: String,
}

/// Object bytes as read back from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Maps object paths to public URLs under one base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrls {
    base: String,
}

impl PublicUrls {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url_for(&self, path: &ObjectPath) -> String {
        format!("{}/{}", self.base, path)
    }

    /// Inverse of `url_for`. URLs from another base yield `None`.
    pub fn path_for(&self, url: &str) -> Option<ObjectPath> {
        let rest = url.strip_prefix(&self.base)?.strip_prefix('/')?;
        let rest = rest.split(['?', '#']).next().unwrap_or(rest);
        ObjectPath::parse(rest).ok()
    }
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store (or overwrite) an object and return where it is served.
    async fn put(&self, path: &ObjectPath, upload: FileUpload) -> Result<StoredObject, ObjectStoreError>;

    async fn get(&self, path: &ObjectPath) -> Result<Option<ObjectBlob>, ObjectStoreError>;

    /// Missing objects are `NotFound`.
    async fn delete(&self, path: &ObjectPath) -> Result<(), ObjectStoreError>;

    fn public_url(&self, path: &ObjectPath) -> String;

    fn path_for_url(&self, url: &str) -> Option<ObjectPath>;
}

#[async_trait]
impl<S> ObjectStore for Arc<S>
where
    S: ObjectStore + ?Sized,
{
    async fn put(&self, path: &ObjectPath, upload: FileUpload) -> Result<StoredObject, ObjectStoreError> {
        (**self).put(path, upload).await
    }

    async fn get(&self, path: &ObjectPath) -> Result<Option<ObjectBlob>, ObjectStoreError> {
        (**self).get(path).await
    }

    async fn delete(&self, path: &ObjectPath) -> Result<(), ObjectStoreError> {
        (**self).delete(path).await
    }

    fn public_url(&self, path: &ObjectPath) -> String {
        (**self).public_url(path)
    }

    fn path_for_url(&self, url: &str) -> Option<ObjectPath> {
        (**self).path_for_url(url)
    }
}
