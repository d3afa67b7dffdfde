use serde::{Deserialize, Serialize};

use aesthetica_core::{CatalogEntity, MediaId, Timestamps};

/// Folder used when an upload does not name one.
pub const DEFAULT_MEDIA_FOLDER: &str = "general";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaFields {
    pub name: String,
    /// Public download URL.
    pub url: String,
    /// Object-storage path the URL points at.
    pub path: String,
    pub content_type: String,
    pub size: u64,
    pub alt: String,
    pub folder: String,
}

/// An uploaded file in the homepage content library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub id: MediaId,
    #[serde(flatten)]
    pub fields: MediaFields,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl CatalogEntity for MediaAsset {
    type Id = MediaId;
    type Fields = MediaFields;
    type Patch = MediaPatch;

    const COLLECTION: &'static str = "media";
    const LABEL: &'static str = "media asset";

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn slug(&self) -> Option<&str> {
        None
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }
}

/// Only descriptive metadata is editable; the stored object is not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
}
