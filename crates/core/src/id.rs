//! Identifiers used across the catalog.
//!
//! Document stores hand out opaque text ids. Typed wrappers keep a product id
//! from being passed where a brand id is expected.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Opaque identifier assigned by a document store on insert.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a fresh identifier.
    ///
    /// Uses UUIDv7 (time-ordered), rendered without hyphens.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl core::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DocumentId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_id("document id cannot be empty"));
        }
        if trimmed.contains('/') {
            return Err(DomainError::invalid_id(format!(
                "document id cannot contain '/': {trimmed}"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// Identifier of a product document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(DocumentId);

/// Identifier of a brand document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrandId(DocumentId);

/// Identifier of a training event document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(DocumentId);

/// Identifier of a media library document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(DocumentId);

macro_rules! impl_document_newtype {
    ($t:ty) => {
        impl $t {
            pub fn new(id: DocumentId) -> Self {
                Self(id)
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<DocumentId> for $t {
            fn from(value: DocumentId) -> Self {
                Self(value)
            }
        }

        impl From<$t> for DocumentId {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(DocumentId::from_str(s)?))
            }
        }
    };
}

impl_document_newtype!(ProductId);
impl_document_newtype!(BrandId);
impl_document_newtype!(EventId);
impl_document_newtype!(MediaId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique_and_path_safe() {
        let a = DocumentId::generate();
        let b = DocumentId::generate();
        assert_ne!(a, b);
        assert!(!a.as_str().contains('/'));
        assert!(!a.as_str().contains('-'));
    }

    #[test]
    fn parse_rejects_empty_and_slashes() {
        assert!("".parse::<DocumentId>().is_err());
        assert!("  ".parse::<DocumentId>().is_err());
        assert!("a/b".parse::<ProductId>().is_err());
        assert_eq!("abc".parse::<ProductId>().unwrap().as_str(), "abc");
    }

    #[test]
    fn typed_ids_serialize_transparently() {
        let id: ProductId = "p-1".parse().unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p-1\"");
    }
}
