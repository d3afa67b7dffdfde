//! Brand, training-event and media-library models.
//!
//! These share the product document shape (store-assigned id and timestamps,
//! camelCase JSON, partial patches) and are served by the same generic
//! gateway.

pub mod brand;
pub mod event;
pub mod media;

pub use brand::{Brand, BrandFields, BrandPatch};
pub use event::{EventFields, EventPatch, TrainingEvent};
pub use media::{DEFAULT_MEDIA_FOLDER, MediaAsset, MediaFields, MediaPatch};
