//! Catalog-wide aggregates for the admin dashboard.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::product::ProductFields;

/// Stock at or below this many units counts as low.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Aggregate counts over the full catalog.
///
/// Recomputed from scratch on every request; nothing is maintained
/// incrementally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub featured: usize,
    pub best_sellers: usize,
    pub new_arrivals: usize,
    pub requires_certification: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
    /// Sum of `price * stock` over every product, active or not.
    pub total_inventory_value: f64,
    pub by_category: BTreeMap<String, usize>,
}

impl ProductStats {
    pub fn from_products<'a>(
        products: impl IntoIterator<Item = &'a ProductFields>,
        low_stock_threshold: i64,
    ) -> Self {
        products
            .into_iter()
            .fold(Self::default(), |mut stats, p| {
                stats.total += 1;
                if p.is_active {
                    stats.active += 1;
                } else {
                    stats.inactive += 1;
                }
                stats.featured += usize::from(p.featured);
                stats.best_sellers += usize::from(p.best_seller);
                stats.new_arrivals += usize::from(p.new_arrival);
                stats.requires_certification += usize::from(p.requires_certification);
                if p.stock <= 0 {
                    stats.out_of_stock += 1;
                } else if p.stock <= low_stock_threshold {
                    stats.low_stock += 1;
                }
                stats.total_inventory_value += p.inventory_value();
                if !p.category.is_empty() {
                    *stats.by_category.entry(p.category.clone()).or_default() += 1;
                }
                stats
            })
    }
}
