//! Entity contract: identity + store-assigned bookkeeping.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::id::DocumentId;

/// Server-assigned bookkeeping carried by every stored catalog document.
///
/// `created_at` is stamped once on insert; `updated_at` on every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A catalog document stored in its own collection.
///
/// The stored JSON form is the entity's fields plus `id`, `createdAt` and
/// `updatedAt`. `Fields` is what callers supply on insert and `Patch` what
/// they supply on partial update (absent keys are left untouched).
pub trait CatalogEntity:
    Clone + core::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Strongly-typed identifier.
    type Id: Clone
        + Eq
        + core::hash::Hash
        + core::fmt::Debug
        + core::fmt::Display
        + From<DocumentId>
        + Into<DocumentId>
        + Send
        + Sync
        + 'static;

    /// Insert payload (everything except id and timestamps).
    type Fields: Clone + core::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Partial update payload.
    type Patch: Clone + core::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Collection the entity lives in (e.g. `"products"`).
    const COLLECTION: &'static str;

    /// Singular noun used in log and error messages.
    const LABEL: &'static str;

    fn id(&self) -> &Self::Id;

    /// Routing slug, for entities that have one.
    fn slug(&self) -> Option<&str>;

    fn timestamps(&self) -> &Timestamps;
}
