use serde::{Deserialize, Serialize};

use aesthetica_core::{BrandId, CatalogEntity, Timestamps};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrandFields {
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub is_active: bool,
    /// Position on the brands page, ascending.
    pub order: i64,
}

/// A manufacturer or partner brand shown on the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    #[serde(flatten)]
    pub fields: BrandFields,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl CatalogEntity for Brand {
    type Id = BrandId;
    type Fields = BrandFields;
    type Patch = BrandPatch;

    const COLLECTION: &'static str = "brands";
    const LABEL: &'static str = "brand";

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn slug(&self) -> Option<&str> {
        Some(&self.fields.slug)
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrandPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}
