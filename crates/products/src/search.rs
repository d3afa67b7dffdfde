//! Client-side catalog search.
//!
//! There is no text index: the gateway fetches active products and filters
//! them here by case-insensitive substring.

use crate::product::ProductFields;

/// A lowercased search needle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn new(term: &str) -> Self {
        Self(term.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty term matches every product.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when name, description, category, sku or any tag contains the term.
    pub fn matches(&self, fields: &ProductFields) -> bool {
        let needle = self.0.as_str();
        contains(&fields.name, needle)
            || contains(&fields.description, needle)
            || contains(&fields.category, needle)
            || contains(&fields.sku, needle)
            || fields.tags.iter().any(|tag| contains(tag, needle))
    }
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}
