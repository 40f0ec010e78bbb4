//! Query resolution: shortcut rules, strategy choice, and failure absorption.
//!
//! Exactly one AI path is chosen per resolution — remote when an endpoint is
//! configured, else local when its runtime is ready, else none. AI failures
//! never reach the user as fatal errors: the resolver substitutes substring
//! search and records a non-fatal warning. An AI path that succeeds with zero
//! products is authoritative "no matches" and is not second-guessed.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::CatalogSnapshot;
use crate::config::SearchConfig;
use crate::model::types::{Product, Query, SearchResult, SearchSource};
use crate::search::fallback;
use crate::search::local::LocalInferenceAdapter;
use crate::search::remote::{RemoteError, RemoteInferenceAdapter};

/// One resolved query: the result plus an optional non-fatal warning
/// recorded when an AI path failed and fallback stood in for it.
#[derive(Debug)]
pub struct Resolution {
    pub result: SearchResult,
    pub warning: Option<String>,
}

impl Resolution {
    fn clean(result: SearchResult) -> Self {
        Self {
            result,
            warning: None,
        }
    }

    fn degraded(result: SearchResult, warning: String) -> Self {
        Self {
            result,
            warning: Some(warning),
        }
    }
}

/// The orchestrator: turns a query and the current capability state into a
/// [`SearchResult`].
pub struct QueryResolver {
    config: SearchConfig,
    local: Arc<LocalInferenceAdapter>,
    remote: Option<RemoteInferenceAdapter>,
}

impl QueryResolver {
    /// Wire the resolver from its configuration. The remote adapter is built
    /// only when an endpoint is configured.
    pub fn new(config: SearchConfig, local: Arc<LocalInferenceAdapter>) -> anyhow::Result<Self> {
        let remote = match &config.remote_endpoint {
            Some(base) => Some(RemoteInferenceAdapter::new(base.clone(), &config)?),
            None => None,
        };
        Ok(Self {
            config,
            local,
            remote,
        })
    }

    /// Resolve one submitted query against the snapshot.
    pub async fn resolve(&self, query: &Query, catalog: &CatalogSnapshot) -> Resolution {
        let trimmed = query.trimmed();

        // Clear-search: an empty query restores the whole catalog.
        if trimmed.is_empty() {
            return Resolution::clean(SearchResult::whole_catalog(catalog.to_vec()));
        }

        if query.wants_everything(&self.config.show_all_keywords) {
            debug!(query = trimmed, "resolve_show_all");
            return Resolution::clean(SearchResult::whole_catalog(catalog.to_vec()));
        }

        // Short queries are exact-term lookups, not natural-language intents.
        if query.len() < self.config.min_semantic_len {
            debug!(query = trimmed, "resolve_below_semantic_threshold");
            return Resolution::clean(self.fallback_result(trimmed, catalog));
        }

        let resolution = if let Some(remote) = &self.remote {
            self.resolve_remote(remote, trimmed, catalog).await
        } else if self.local.is_ready() {
            self.resolve_local(trimmed, catalog)
        } else {
            debug!(query = trimmed, "resolve_no_ai_available");
            Resolution::clean(self.fallback_result(trimmed, catalog))
        };

        info!(
            query = trimmed,
            source = resolution.result.source.label(),
            count = resolution.result.products.len(),
            degraded = resolution.warning.is_some(),
            "resolve_done"
        );
        resolution
    }

    /// While-typing filter: always deterministic substring search, never AI.
    /// Does not drive the state machine.
    pub fn filter_incremental(&self, query: &Query, catalog: &CatalogSnapshot) -> SearchResult {
        let trimmed = query.trimmed();
        if trimmed.is_empty() {
            return SearchResult::whole_catalog(catalog.to_vec());
        }
        self.fallback_result(trimmed, catalog)
    }

    async fn resolve_remote(
        &self,
        remote: &RemoteInferenceAdapter,
        query: &str,
        catalog: &CatalogSnapshot,
    ) -> Resolution {
        match remote.filter(query, catalog).await {
            Ok(products) if products.is_empty() => {
                Resolution::clean(SearchResult::authoritative_empty(SearchSource::RemoteAi))
            }
            Ok(products) => {
                Resolution::clean(SearchResult::with_products(products, SearchSource::RemoteAi))
            }
            // The adapter's own gate fired; plain fallback, nothing went wrong.
            Err(RemoteError::QueryTooShort) => {
                debug!(query, "remote_gate_below_threshold");
                Resolution::clean(self.fallback_result(query, catalog))
            }
            Err(err) => {
                warn!(query, error = %err, "remote_filter_failed_falling_back");
                Resolution::degraded(
                    self.fallback_result(query, catalog),
                    format!("remote filtering failed: {err}"),
                )
            }
        }
    }

    fn resolve_local(&self, query: &str, catalog: &CatalogSnapshot) -> Resolution {
        match self.local.infer(query, catalog) {
            Ok(ids) if ids.is_empty() => {
                Resolution::clean(SearchResult::authoritative_empty(SearchSource::LocalAi))
            }
            Ok(ids) => Resolution::clean(SearchResult::with_products(
                select_by_ids(catalog, &ids),
                SearchSource::LocalAi,
            )),
            Err(err) => {
                warn!(query, error = %err, "local_inference_failed_falling_back");
                Resolution::degraded(
                    self.fallback_result(query, catalog),
                    format!("local inference failed: {err}"),
                )
            }
        }
    }

    fn fallback_result(&self, query: &str, catalog: &CatalogSnapshot) -> SearchResult {
        SearchResult::with_products(fallback::matches(query, catalog), SearchSource::Fallback)
    }
}

/// Materialize an id list into products, preserving catalog order.
fn select_by_ids(catalog: &CatalogSnapshot, ids: &[u64]) -> Vec<Product> {
    let wanted: HashSet<u64> = ids.iter().copied().collect();
    catalog
        .products()
        .iter()
        .filter(|p| wanted.contains(&p.id))
        .cloned()
        .collect()
}
