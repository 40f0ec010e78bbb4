//! Pipeline configuration.

use std::time::Duration;

/// Minimum query length (chars) before an AI path is considered. Anything
/// shorter is assumed to be an exact-term lookup and goes straight to
/// substring search.
pub const DEFAULT_MIN_SEMANTIC_LEN: usize = 5;

/// Minimum query length for the remote structured-extraction call. The remote
/// adapter enforces this itself so it never pays network latency for a
/// trivially short query, even under a miswired resolver.
pub const DEFAULT_MIN_REMOTE_LEN: usize = 4;

/// Request timeout for the remote filter call. An unresponsive model call
/// must not hang the UI indefinitely.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Bypass phrases meaning "list everything"; matched as substrings of the
/// lowercased query.
pub const SHOW_ALL_KEYWORDS: [&str; 4] = ["all", "show", "list", "products"];

/// Environment variable naming the remote structured-extraction base URL.
/// The one piece of environment configuration the pipeline reads.
pub const REMOTE_ENDPOINT_ENV: &str = "STOREFRONT_AI_ENDPOINT";

/// Tunables for the query-resolution pipeline.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Base URL of the remote structured-extraction service, when configured.
    /// `None` means the remote path is never chosen.
    pub remote_endpoint: Option<String>,
    /// Queries with fewer chars than this skip AI entirely.
    pub min_semantic_len: usize,
    /// The remote adapter's own length gate.
    pub min_remote_len: usize,
    /// Per-request timeout on the remote HTTP client.
    pub http_timeout: Duration,
    /// "Show everything" keyword set.
    pub show_all_keywords: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            remote_endpoint: None,
            min_semantic_len: DEFAULT_MIN_SEMANTIC_LEN,
            min_remote_len: DEFAULT_MIN_REMOTE_LEN,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            show_all_keywords: SHOW_ALL_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl SearchConfig {
    /// Defaults plus the remote endpoint from the environment, if set.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(url) = dotenvy::var(REMOTE_ENDPOINT_ENV)
            && !url.trim().is_empty()
        {
            cfg.remote_endpoint = Some(url.trim().to_string());
        }
        cfg
    }

    pub fn remote_configured(&self) -> bool {
        self.remote_endpoint.is_some()
    }
}
