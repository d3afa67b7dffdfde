use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value as JsonValue;

use aesthetica_core::DocumentId;
use aesthetica_events::{ChangeEvent, ChangeKind, EventBus, InMemoryEventBus, Subscription};

use super::{Document, DocumentStore, Query, StoreError, StoredDocument, strip_reserved};

/// Store operations, for call counting and failure injection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Get,
    Query,
    Insert,
    Merge,
    Increment,
    Delete,
}

/// Snapshot of how many times each operation reached the store.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub get: usize,
    pub query: usize,
    pub insert: usize,
    pub merge: usize,
    pub increment: usize,
    pub delete: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.get + self.query + self.insert + self.merge + self.increment + self.delete
    }

    pub fn reads(&self) -> usize {
        self.get + self.query
    }
}

#[derive(Debug, Default)]
struct Counters {
    get: AtomicUsize,
    query: AtomicUsize,
    insert: AtomicUsize,
    merge: AtomicUsize,
    increment: AtomicUsize,
    delete: AtomicUsize,
}

impl Counters {
    fn bump(&self, op: StoreOperation) {
        let counter = match op {
            StoreOperation::Get => &self.get,
            StoreOperation::Query => &self.query,
            StoreOperation::Insert => &self.insert,
            StoreOperation::Merge => &self.merge,
            StoreOperation::Increment => &self.increment,
            StoreOperation::Delete => &self.delete,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }

    fn snapshot(&self) -> CallCounts {
        CallCounts {
            get: self.get.load(Ordering::SeqCst),
            query: self.query.load(Ordering::SeqCst),
            insert: self.insert.load(Ordering::SeqCst),
            merge: self.merge.load(Ordering::SeqCst),
            increment: self.increment.load(Ordering::SeqCst),
            delete: self.delete.load(Ordering::SeqCst),
        }
    }
}

type Collection = BTreeMap<DocumentId, StoredDocument>;

/// In-memory document store.
///
/// Intended for tests/dev and single-process deployments. Counts every call
/// that reaches it and can be told to fail specific operations, which is how
/// gateway caching and error paths are verified.
///
/// Ids are UUIDv7, so iteration order of a collection is insertion order.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
    bus: InMemoryEventBus<ChangeEvent>,
    counters: Counters,
    failing: Mutex<HashSet<StoreOperation>>,
    last_stamp: Mutex<Option<DateTime<Utc>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_counts(&self) -> CallCounts {
        self.counters.snapshot()
    }

    /// Make every subsequent call of `op` fail with a backend error.
    pub fn fail_operation(&self, op: StoreOperation) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.insert(op);
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut failing) = self.failing.lock() {
            failing.clear();
        }
    }

    /// Count the call, then fail it if injected.
    fn enter(&self, op: StoreOperation) -> Result<(), StoreError> {
        self.counters.bump(op);
        let failing = self
            .failing
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        if failing.contains(&op) {
            return Err(StoreError::Backend(format!("injected failure for {op:?}")));
        }
        Ok(())
    }

    /// Strictly increasing store clock, so `updatedAt` always moves forward.
    fn stamp(&self) -> Result<DateTime<Utc>, StoreError> {
        let mut last = self
            .last_stamp
            .lock()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))?;
        // Microsecond resolution, matching what documents serialize.
        let now = Utc::now();
        let now = DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now);
        let next = match *last {
            Some(prev) if now <= prev => prev + Duration::microseconds(1),
            _ => now,
        };
        *last = Some(next);
        Ok(next)
    }

    fn announce(&self, collection: &str, id: &DocumentId, kind: ChangeKind, at: DateTime<Utc>) {
        let _ = self
            .bus
            .publish(ChangeEvent::new(collection, id.clone(), kind, at));
    }

    fn poisoned() -> StoreError {
        StoreError::Backend("lock poisoned".to_string())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError> {
        self.enter(StoreOperation::Get)?;
        let collections = self.collections.read().map_err(|_| Self::poisoned())?;
        Ok(collections.get(collection).and_then(|c| c.get(id)).cloned())
    }

    async fn query(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.enter(StoreOperation::Query)?;
        let collections = self.collections.read().map_err(|_| Self::poisoned())?;
        let docs = collections
            .get(collection)
            .map(|c| c.values().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        Ok(query.apply(docs))
    }

    async fn insert(&self, collection: &str, mut data: Document) -> Result<StoredDocument, StoreError> {
        self.enter(StoreOperation::Insert)?;
        strip_reserved(&mut data);
        let now = self.stamp()?;
        let stored = StoredDocument {
            id: DocumentId::generate(),
            data,
            created_at: now,
            updated_at: now,
        };

        {
            let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
            collections
                .entry(collection.to_string())
                .or_default()
                .insert(stored.id.clone(), stored.clone());
        }

        self.announce(collection, &stored.id, ChangeKind::Created, now);
        Ok(stored)
    }

    async fn merge(
        &self,
        collection: &str,
        id: &DocumentId,
        mut data: Document,
    ) -> Result<StoredDocument, StoreError> {
        self.enter(StoreOperation::Merge)?;
        strip_reserved(&mut data);
        let now = self.stamp()?;

        let merged = {
            let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
            let doc = collections
                .get_mut(collection)
                .and_then(|c| c.get_mut(id))
                .ok_or_else(|| StoreError::not_found(collection, id))?;
            doc.data.extend(data);
            doc.updated_at = now;
            doc.clone()
        };

        self.announce(collection, id, ChangeKind::Updated, now);
        Ok(merged)
    }

    async fn increment(
        &self,
        collection: &str,
        id: &DocumentId,
        field: &str,
        delta: i64,
    ) -> Result<StoredDocument, StoreError> {
        self.enter(StoreOperation::Increment)?;
        let now = self.stamp()?;

        let updated = {
            let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
            let doc = collections
                .get_mut(collection)
                .and_then(|c| c.get_mut(id))
                .ok_or_else(|| StoreError::not_found(collection, id))?;
            let current = match doc.data.get(field) {
                None | Some(JsonValue::Null) => 0,
                Some(value) => value.as_i64().ok_or_else(|| {
                    StoreError::InvalidQuery(format!("field '{field}' is not an integer"))
                })?,
            };
            doc.data
                .insert(field.to_string(), JsonValue::from(current + delta));
            doc.updated_at = now;
            doc.clone()
        };

        self.announce(collection, id, ChangeKind::Updated, now);
        Ok(updated)
    }

    async fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError> {
        self.enter(StoreOperation::Delete)?;

        {
            let mut collections = self.collections.write().map_err(|_| Self::poisoned())?;
            collections
                .get_mut(collection)
                .and_then(|c| c.remove(id))
                .ok_or_else(|| StoreError::not_found(collection, id))?;
        }

        let now = self.stamp()?;
        self.announce(collection, id, ChangeKind::Deleted, now);
        Ok(())
    }

    fn watch(&self, collection: &str) -> Subscription<ChangeEvent> {
        let collection = collection.to_string();
        self.bus
            .subscribe()
            .filtered(move |ev: &ChangeEvent| ev.collection() == collection)
    }
}
