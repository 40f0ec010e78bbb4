//! AI-assisted product search with a deterministic fallback.
//!
//! This crate turns a raw search string into a filtered, ordered product list
//! by choosing among three strategies and keeping the UI-observable state
//! consistent while one of them is in flight:
//!
//! ```text
//! User query
//!     │
//!     ├──→ [RemoteInferenceAdapter] ── structured-extraction endpoint
//!     │         (preferred when an endpoint is configured)
//!     ├──→ [LocalInferenceAdapter] ─── in-process model, ranked id list
//!     │         (when the local runtime is ready)
//!     └──→ [FallbackMatcher] ───────── case-insensitive substring search
//!               (short queries, AI unavailable, or AI failure)
//! ```
//!
//! [`QueryResolver`] picks exactly one AI path per resolution, applies the
//! length and show-all shortcuts, and absorbs AI failures by falling back to
//! substring search with a non-fatal warning. [`SearchStateMachine`] sequences
//! the `Idle → Loading → {Success, NoResults, Error}` transitions the renderer
//! consumes. [`SearchSession`] wires the pieces together the way a UI mount
//! would.

pub mod catalog;
pub mod config;
pub mod model;
pub mod search;
pub mod session;
pub mod ui;

pub use catalog::CatalogSnapshot;
pub use config::SearchConfig;
pub use model::types::{Product, Query, SearchResult, SearchSource};
pub use search::local::{ChatModel, LocalInferenceAdapter, LocalModelAvailability};
pub use search::remote::RemoteInferenceAdapter;
pub use search::resolver::{QueryResolver, Resolution};
pub use session::SearchSession;
pub use ui::state::{Outcome, SearchStateMachine, SearchUiState};
