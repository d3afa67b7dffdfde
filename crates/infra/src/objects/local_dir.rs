//! Object store rooted at a local directory.
//!
//! Files are written under `root/<path>` and served by the API under the
//! configured public base URL. The content type is not persisted; it is
//! re-derived from the file extension on read.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::{
    FileUpload, ObjectBlob, ObjectPath, ObjectStore, ObjectStoreError, PublicUrls, StoredObject,
    guess_content_type,
};

#[derive(Debug, Clone)]
pub struct LocalDirObjectStore {
    root: PathBuf,
    urls: PublicUrls,
}

impl LocalDirObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            urls: PublicUrls::new(public_base_url),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, path: &ObjectPath) -> PathBuf {
        path.segments()
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }
}

fn io_error(op: &str, path: &ObjectPath, err: std::io::Error) -> ObjectStoreError {
    match err.kind() {
        ErrorKind::NotFound => ObjectStoreError::NotFound(path.to_string()),
        _ => ObjectStoreError::Backend(format!("{op} {path}: {err}")),
    }
}

#[async_trait]
impl ObjectStore for LocalDirObjectStore {
    async fn put(&self, path: &ObjectPath, upload: FileUpload) -> Result<StoredObject, ObjectStoreError> {
        let target = self.file_path(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ObjectStoreError::Backend(format!("create dir for {path}: {e}")))?;
        }

        let content_type = upload.resolved_content_type();
        let size = upload.bytes.len() as u64;
        fs::write(&target, &upload.bytes)
            .await
            .map_err(|e| ObjectStoreError::Backend(format!("write {path}: {e}")))?;
        debug!(path = %path, size, "object written");

        Ok(StoredObject {
            path: path.clone(),
            url: self.urls.url_for(path),
            size,
            content_type,
        })
    }

    async fn get(&self, path: &ObjectPath) -> Result<Option<ObjectBlob>, ObjectStoreError> {
        match fs::read(self.file_path(path)).await {
            Ok(bytes) => Ok(Some(ObjectBlob {
                bytes,
                content_type: guess_content_type(path.file_name()).to_string(),
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("read", path, e)),
        }
    }

    async fn delete(&self, path: &ObjectPath) -> Result<(), ObjectStoreError> {
        fs::remove_file(self.file_path(path))
            .await
            .map_err(|e| io_error("delete", path, e))
    }

    fn public_url(&self, path: &ObjectPath) -> String {
        self.urls.url_for(path)
    }

    fn path_for_url(&self, url: &str) -> Option<ObjectPath> {
        self.urls.path_for(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("aesthetica-objects-{}", uuid::Uuid::now_v7().simple()))
    }

    #[tokio::test]
    async fn writes_under_root_and_reads_back() {
        let root = scratch_dir();
        let store = LocalDirObjectStore::new(&root, "http://localhost:8080/files");
        let path = ObjectPath::parse("products/p1/serum.webp").unwrap();

        let stored = store
            .put(&path, FileUpload::new("serum.webp", b"webp".to_vec()))
            .await
            .unwrap();
        assert_eq!(stored.url, "http://localhost:8080/files/products/p1/serum.webp");
        assert!(root.join("products").join("p1").join("serum.webp").exists());

        let blob = store.get(&path).await.unwrap().unwrap();
        assert_eq!(blob.bytes, b"webp");
        assert_eq!(blob.content_type, "image/webp");

        store.delete(&path).await.unwrap();
        assert_eq!(store.get(&path).await.unwrap(), None);
        assert!(matches!(
            store.delete(&path).await,
            Err(ObjectStoreError::NotFound(_))
        ));

        let _ = std::fs::remove_dir_all(&root);
    }
}
