//! End-to-end wiring a UI mount would own.
//!
//! Explicit construction instead of a process-wide singleton: the caller
//! builds the local adapter, fetches a catalog snapshot, and hands both to
//! the session. Initialization ordering is visible and test substitution is
//! a constructor argument away.

use std::sync::Arc;

use tracing::warn;

use crate::catalog::CatalogSnapshot;
use crate::config::SearchConfig;
use crate::model::types::{Query, SearchResult};
use crate::search::local::LocalInferenceAdapter;
use crate::search::resolver::QueryResolver;
use crate::ui::state::{Outcome, SearchStateMachine, SearchUiState};

/// One page-load's worth of search: resolver, state machine, and the catalog
/// snapshot they operate on.
pub struct SearchSession {
    resolver: QueryResolver,
    machine: SearchStateMachine,
    local: Arc<LocalInferenceAdapter>,
    catalog: CatalogSnapshot,
}

impl SearchSession {
    pub fn new(
        config: SearchConfig,
        local: Arc<LocalInferenceAdapter>,
        catalog: CatalogSnapshot,
    ) -> anyhow::Result<Self> {
        let resolver = QueryResolver::new(config, Arc::clone(&local))?;
        Ok(Self {
            resolver,
            machine: SearchStateMachine::new(),
            local,
            catalog,
        })
    }

    /// Kick off the one-time local model load.
    ///
    /// A failure disables the local path for the session; basic search keeps
    /// working, so the error is logged rather than propagated.
    pub fn initialize_local_model(&self) {
        if let Err(err) = self.local.initialize() {
            warn!(error = %err, "local model unavailable for this session");
        }
    }

    /// Submit a query and drive it to completion.
    ///
    /// Returns `false` if a resolution is already in flight (the submission
    /// is ignored, matching the disabled input box).
    pub async fn submit(&mut self, query: &str) -> bool {
        if !self.machine.submit(query) {
            return false;
        }
        let resolution = self
            .resolver
            .resolve(&Query::new(query), &self.catalog)
            .await;
        self.machine.complete(Outcome::Resolved(resolution));
        true
    }

    /// While-typing filter; never AI, never touches the state machine.
    pub fn filter_incremental(&self, query: &str) -> SearchResult {
        self.resolver
            .filter_incremental(&Query::new(query), &self.catalog)
    }

    /// The query was cleared.
    pub fn clear(&mut self) {
        self.machine.clear();
    }

    pub fn state(&self) -> &SearchUiState {
        self.machine.state()
    }

    pub fn state_machine(&self) -> &SearchStateMachine {
        &self.machine
    }

    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }
}
