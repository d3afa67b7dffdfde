//! Products domain module.
//!
//! This crate contains the product catalog model and the pure logic the
//! gateway layers on top of it (search matching, aggregate stats, slugs),
//! with no IO, no HTTP and no storage.

pub mod filters;
pub mod product;
pub mod search;
pub mod slug;
pub mod stats;

pub use filters::ProductFilters;
pub use product::{
    CertificationLevel, Dimensions, LocalizedText, Product, ProductFields, ProductImage,
    ProductPatch, TextOrList,
};
pub use search::SearchTerm;
pub use slug::{ALL_PRODUCTS_SLUG, slugify};
pub use stats::{DEFAULT_LOW_STOCK_THRESHOLD, ProductStats};
