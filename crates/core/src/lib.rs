//! `aesthetica-core`: shared catalog building blocks.
//!
//! This crate contains **pure** primitives (no IO): identifiers, the entity
//! contract every stored catalog document satisfies, and the domain error model.

pub mod entity;
pub mod error;
pub mod id;

pub use entity::{CatalogEntity, Timestamps};
pub use error::{DomainError, DomainResult};
pub use id::{BrandId, DocumentId, EventId, MediaId, ProductId};
