use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;

use super::{FileUpload, ObjectBlob, ObjectPath, ObjectStore, ObjectStoreError, PublicUrls, StoredObject};

/// Object store kept in process memory. Tests and dev only.
#[derive(Debug)]
pub struct InMemoryObjectStore {
    urls: PublicUrls,
    objects: RwLock<BTreeMap<ObjectPath, ObjectBlob>>,
}

impl InMemoryObjectStore {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            urls: PublicUrls::new(public_base_url),
            objects: RwLock::new(BTreeMap::new()),
        }
    }

    /// Paths of every stored object, sorted.
    pub fn paths(&self) -> Vec<ObjectPath> {
        self.objects
            .read()
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, path: &ObjectPath) -> bool {
        self.objects
            .read()
            .map(|objects| objects.contains_key(path))
            .unwrap_or(false)
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new("memory://objects")
    }
}

fn poisoned() -> ObjectStoreError {
    ObjectStoreError::Backend("lock poisoned".to_string())
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, path: &ObjectPath, upload: FileUpload) -> Result<StoredObject, ObjectStoreError> {
        let content_type = upload.resolved_content_type();
        let size = upload.bytes.len() as u64;
        self.objects.write().map_err(|_| poisoned())?.insert(
            path.clone(),
            ObjectBlob {
                bytes: upload.bytes,
                content_type: content_type.clone(),
            },
        );

        Ok(StoredObject {
            path: path.clone(),
            url: self.urls.url_for(path),
            size,
            content_type,
        })
    }

    async fn get(&self, path: &ObjectPath) -> Result<Option<ObjectBlob>, ObjectStoreError> {
        Ok(self.objects.read().map_err(|_| poisoned())?.get(path).cloned())
    }

    async fn delete(&self, path: &ObjectPath) -> Result<(), ObjectStoreError> {
        self.objects
            .write()
            .map_err(|_| poisoned())?
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| ObjectStoreError::NotFound(path.to_string()))
    }

    fn public_url(&self, path: &ObjectPath) -> String {
        self.urls.url_for(path)
    }

    fn path_for_url(&self, url: &str) -> Option<ObjectPath> {
        self.urls.path_for(url)
    }
}
