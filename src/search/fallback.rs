//! Deterministic substring fallback search.
//!
//! Always available as the last resort: no model, no network, no failure
//! mode. Used directly for short queries and whenever an AI path is
//! unavailable or fails.

use crate::catalog::CatalogSnapshot;
use crate::model::types::Product;

/// Case-insensitive substring match over title, description, and category.
///
/// A product is included when the query occurs in any of the three fields.
/// Catalog order is preserved.
pub fn matches(query: &str, catalog: &CatalogSnapshot) -> Vec<Product> {
    let needle = query.trim().to_lowercase();
    catalog
        .products()
        .iter()
        .filter(|p| {
            p.title.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
                || p.category.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
