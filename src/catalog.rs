//! Catalog snapshot and the one-shot products fetch.

use std::collections::HashSet;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

use crate::model::types::Product;

/// The product list as fetched at a point in time.
///
/// Treated as immutable for the duration of a single search resolution. Keeps
/// an id set alongside the ordered list so membership checks are O(1).
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    products: Vec<Product>,
    ids: HashSet<u64>,
}

impl CatalogSnapshot {
    pub fn new(products: Vec<Product>) -> Self {
        let ids = products.iter().map(|p| p.id).collect();
        Self { products, ids }
    }

    /// Products in fetch order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Whether `id` exists in this snapshot.
    pub fn contains_id(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Owned copy of the full product list, for whole-catalog results and
    /// remote request bodies.
    pub fn to_vec(&self) -> Vec<Product> {
        self.products.clone()
    }
}

/// Fetch the catalog once from the products endpoint.
///
/// A single unauthenticated GET returning a JSON array of products; called
/// once per page load. The caller supplies the client so timeout policy is
/// set in one place.
pub async fn fetch(client: &Client, base_url: &str) -> Result<CatalogSnapshot> {
    let url = format!("{}/products", base_url.trim_end_matches('/'));
    let response = client
        .get(&url)
        .send()
        .await
        .context("fetching catalog")?;

    if !response.status().is_success() {
        anyhow::bail!("catalog endpoint returned {}", response.status());
    }

    let products: Vec<Product> = response.json().await.context("parsing catalog JSON")?;
    debug!(count = products.len(), "catalog_fetched");
    Ok(CatalogSnapshot::new(products))
}
