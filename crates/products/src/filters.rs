//! Equality filters for live product listings.

use serde::{Deserialize, Serialize};

/// Optional equality constraints. Unset fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductFilters {
    pub category: Option<String>,
    pub is_active: Option<bool>,
    pub featured: Option<bool>,
    pub best_seller: Option<bool>,
    pub new_arrival: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_keys_stay_unconstrained() {
        let filters: ProductFilters =
            serde_json::from_value(serde_json::json!({ "category": "peels", "bestSeller": true }))
                .unwrap();
        assert_eq!(
            filters,
            ProductFilters {
                category: Some("peels".to_string()),
                best_seller: Some(true),
                ..ProductFilters::default()
            }
        );
    }
}
