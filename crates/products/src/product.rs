use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use aesthetica_core::{CatalogEntity, ProductId, Timestamps};

/// Certification a clinician needs before buying a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificationLevel {
    #[default]
    None,
    Basic,
    Advanced,
    Expert,
}

/// Free text or a structured list.
///
/// Older catalog entries store ingredients/benefits as one paragraph; newer
/// ones as a list. Both shapes are accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrList {
    Text(String),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_dimension_unit")]
    pub unit: String,
}

fn default_dimension_unit() -> String {
    "cm".to_string()
}

/// Translated copy for one locale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalizedText {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Everything about a product except its identity and bookkeeping.
///
/// This is the insert payload. Missing keys default, unknown keys are ignored,
/// so documents written by older admin screens still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductFields {
    pub slug: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    pub description: String,
    /// Locale code (e.g. `"es"`) to translated copy.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub localized: BTreeMap<String, LocalizedText>,

    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    pub sku: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<TextOrList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benefits: Option<TextOrList>,

    pub price: f64,
    /// Units on hand. Not reconciled against any order system; may go negative.
    pub stock: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub images: Vec<ProductImage>,

    pub is_active: bool,
    pub featured: bool,
    pub best_seller: bool,
    pub new_arrival: bool,
    pub requires_certification: bool,
    pub certification_level: CertificationLevel,
}

impl ProductFields {
    /// Stock value at list price.
    pub fn inventory_value(&self) -> f64 {
        self.price * self.stock as f64
    }
}

/// A stored product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(flatten)]
    pub fields: ProductFields,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl CatalogEntity for Product {
    type Id = ProductId;
    type Fields = ProductFields;
    type Patch = ProductPatch;

    const COLLECTION: &'static str = "products";
    const LABEL: &'static str = "product";

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

/// Partial update: only the keys that are present are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub localized: Option<BTreeMap<String, LocalizedText>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<TextOrList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benefits: Option<TextOrList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ProductImage>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_seller: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_arrival: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_certification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certification_level: Option<CertificationLevel>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn sample_fields() -> ProductFields {
        ProductFields {
            slug: "exosome-serum".to_string(),
            name: "Exosome Serum".to_string(),
            description: "Regenerative serum".to_string(),
            category: "serums".to_string(),
            sku: "EXO-001".to_string(),
            tags: vec!["exosome".to_string(), "regenerative".to_string()],
            price: 120.0,
            stock: 4,
            is_active: true,
            certification_level: CertificationLevel::Advanced,
            ..ProductFields::default()
        }
    }

    #[test]
    fn fields_serialize_camel_case_and_skip_absent_options() {
        let value = serde_json::to_value(sample_fields()).unwrap();
        let obj = value.as_object().unwrap();

        assert_eq!(obj["isActive"], json!(true));
        assert_eq!(obj["certificationLevel"], json!("advanced"));
        assert_eq!(obj["bestSeller"], json!(false));
        assert!(!obj.contains_key("title"));
        assert!(!obj.contains_key("localized"));
        assert!(!obj.contains_key("is_active"));
    }

    #[test]
    fn product_reads_legacy_documents_with_missing_keys() {
        let doc = json!({
            "id": "abc",
            "name": "Peel Kit",
            "price": 35,
            "ingredients": "Glycolic acid\n\nLactic acid",
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-02T00:00:00Z",
            "someRetiredField": 1
        });

        let product: Product = serde_json::from_value(doc).unwrap();
        assert_eq!(product.id.as_str(), "abc");
        assert_eq!(product.fields.price, 35.0);
        assert_eq!(product.fields.stock, 0);
        assert!(!product.fields.is_active);
        assert_eq!(product.fields.certification_level, CertificationLevel::None);
        assert_eq!(
            product.fields.ingredients,
            Some(TextOrList::Text("Glycolic acid\n\nLactic acid".to_string()))
        );
        assert_eq!(
            product.timestamps.created_at,
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn text_or_list_accepts_both_shapes() {
        let text: TextOrList = serde_json::from_value(json!("Hydrates")).unwrap();
        let list: TextOrList = serde_json::from_value(json!(["Hydrates", "Firms"])).unwrap();
        assert_eq!(text, TextOrList::Text("Hydrates".to_string()));
        assert_eq!(
            list,
            TextOrList::List(vec!["Hydrates".to_string(), "Firms".to_string()])
        );
    }

    #[test]
    fn patch_serializes_only_present_keys() {
        let value = serde_json::to_value(ProductPatch {
            price: Some(42.0),
            ..ProductPatch::default()
        }).unwrap();
        assert_eq!(value, json!({ "price": 42.0 }));

        let empty = serde_json::to_value(ProductPatch::default()).unwrap();
        assert_eq!(empty, json!({}));
    }

    #[test]
    fn inventory_value_allows_negative_stock() {
        let mut fields = sample_fields();
        assert_eq!(fields.inventory_value(), 480.0);
        fields.stock = -2;
        assert_eq!(fields.inventory_value(), -240.0);
    }
}
