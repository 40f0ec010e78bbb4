//! UI-observable search state.
//!
//! One tagged variant instead of independent loading/ai-loading/no-results
//! flags, so contradictory combinations are unrepresentable. The state is
//! owned by [`SearchStateMachine`] and mutated only through its transition
//! functions; rendering consumes it read-only.

use tracing::{debug, warn};

use crate::model::types::SearchResult;
use crate::search::resolver::Resolution;

/// The states the renderer can observe.
///
/// `Idle → Loading → {Success, NoResults, Error}`; any terminal state goes
/// back to `Loading` on the next submission, or to `Idle` on clear.
#[derive(Debug, Clone)]
pub enum SearchUiState {
    /// No search active; the whole catalog is shown.
    Idle,
    /// A resolution is in flight; new submissions are ignored until it
    /// completes.
    Loading { query: String },
    /// A result is available. `warning` carries the non-fatal cause when the
    /// products came from fallback after an AI failure.
    Success {
        result: SearchResult,
        warning: Option<String>,
    },
    /// An AI path answered with an authoritative empty result; carries the
    /// query text for display.
    NoResults { query: String },
    /// A resolver-internal contract violation. Absorbed AI failures never
    /// land here — they surface as `Success` with a warning.
    Error { message: String },
}

impl SearchUiState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// Terminal states allow a new submission.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Success { .. } | Self::NoResults { .. } | Self::Error { .. }
        )
    }

    /// Short label for status displays.
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Loading { .. } => "...",
            Self::Success { warning: None, .. } => "OK",
            Self::Success {
                warning: Some(_), ..
            } => "OK*",
            Self::NoResults { .. } => "NONE",
            Self::Error { .. } => "ERR",
        }
    }
}

/// What the in-flight resolution produced.
#[derive(Debug)]
pub enum Outcome {
    /// The resolver finished, possibly degraded to fallback.
    Resolved(Resolution),
    /// Resolver-internal contract violation (e.g. malformed configuration).
    Failed(String),
}

/// Sequences UI state transitions driven by resolver outcomes.
#[derive(Debug, Default)]
pub struct SearchStateMachine {
    state: SearchUiState,
    last_result: Option<SearchResult>,
    last_error: Option<String>,
}

impl Default for SearchUiState {
    fn default() -> Self {
        Self::Idle
    }
}

impl SearchStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SearchUiState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Last result applied, surviving transitions back to `Loading`.
    pub fn last_result(&self) -> Option<&SearchResult> {
        self.last_result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn status_label(&self) -> &'static str {
        self.state.status_label()
    }

    /// Begin a resolution for `query`.
    ///
    /// Returns `false` and leaves the state untouched while a resolution is
    /// already in flight — the coarse mutual-exclusion rule that guarantees
    /// results apply in submission order.
    pub fn submit(&mut self, query: &str) -> bool {
        if self.state.is_loading() {
            debug!(query, "submit_ignored_while_loading");
            return false;
        }
        self.state = SearchUiState::Loading {
            query: query.trim().to_string(),
        };
        true
    }

    /// Apply the outcome of the in-flight resolution.
    ///
    /// A no-op unless currently `Loading`: completions can only follow a
    /// submission, and there is at most one in flight.
    pub fn complete(&mut self, outcome: Outcome) {
        let query = match &self.state {
            SearchUiState::Loading { query } => query.clone(),
            _ => {
                debug!("complete_ignored_not_loading");
                return;
            }
        };

        match outcome {
            Outcome::Resolved(resolution) => {
                if resolution.result.empty {
                    self.last_result = Some(resolution.result);
                    self.state = SearchUiState::NoResults { query };
                } else {
                    if let Some(warning) = &resolution.warning {
                        warn!(query, warning = %warning, "search_degraded");
                    }
                    self.last_result = Some(resolution.result.clone());
                    self.state = SearchUiState::Success {
                        result: resolution.result,
                        warning: resolution.warning,
                    };
                }
            }
            Outcome::Failed(message) => {
                self.last_error = Some(message.clone());
                self.state = SearchUiState::Error { message };
            }
        }
    }

    /// The query was cleared; back to `Idle` from any state.
    pub fn clear(&mut self) {
        self.state = SearchUiState::Idle;
        self.last_result = None;
        self.last_error = None;
    }
}
