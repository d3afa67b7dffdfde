use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aesthetica_core::DocumentId;

use crate::event::Event;

/// What happened to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Created => "created",
            ChangeKind::Updated => "updated",
            ChangeKind::Deleted => "deleted",
        }
    }
}

/// Notification that a document in a collection changed.
///
/// Carries identity only, not the document body. Listeners that need the
/// current state re-read it from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    collection: String,
    document_id: DocumentId,
    kind: ChangeKind,
    occurred_at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(
        collection: impl Into<String>,
        document_id: DocumentId,
        kind: ChangeKind,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            collection: collection.into(),
            document_id,
            kind,
            occurred_at,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }
}

impl Event for ChangeEvent {
    fn event_type(&self) -> String {
        format!("{}.{}", self.collection, self.kind.as_str())
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_combines_collection_and_kind() {
        let at = Utc::now();
        let ev = ChangeEvent::new("products", DocumentId::generate(), ChangeKind::Deleted, at);
        assert_eq!(ev.event_type(), "products.deleted");
        assert_eq!(ev.collection(), "products");
        assert_eq!(ev.occurred_at(), at);
    }
}
