//! Core catalog and search-result types.

use serde::{Deserialize, Serialize};

/// A single catalog record.
///
/// Immutable once fetched; `id` is unique within a catalog snapshot. Every
/// product returned by any search strategy must carry an `id` present in the
/// snapshot that was searched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub image: String,
}

/// Which strategy produced a [`SearchResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchSource {
    Fallback,
    LocalAi,
    RemoteAi,
}

impl SearchSource {
    /// Short label for logs and status displays.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fallback => "fallback",
            Self::LocalAi => "local-ai",
            Self::RemoteAi => "remote-ai",
        }
    }
}

/// A user-supplied search string plus derived metadata.
///
/// Queries are ephemeral: one per keystroke or submit event, never persisted.
#[derive(Debug, Clone)]
pub struct Query {
    raw: String,
}

impl Query {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The raw text as typed.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The text with surrounding whitespace removed.
    pub fn trimmed(&self) -> &str {
        self.raw.trim()
    }

    pub fn is_empty(&self) -> bool {
        self.trimmed().is_empty()
    }

    /// Character count of the trimmed text.
    pub fn len(&self) -> usize {
        self.trimmed().chars().count()
    }

    /// Whether the query contains one of the "list everything" keywords.
    ///
    /// Substring containment on the lowercased text, so a keyword buried in a
    /// longer word still triggers the bypass.
    pub fn wants_everything(&self, keywords: &[String]) -> bool {
        let lower = self.trimmed().to_lowercase();
        keywords.iter().any(|kw| lower.contains(kw.as_str()))
    }
}

/// The outcome of one resolved query. Immutable after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Matching products, in catalog order.
    pub products: Vec<Product>,
    /// Strategy that produced the list.
    pub source: SearchSource,
    /// True only for an authoritative "the AI found nothing" outcome.
    pub empty: bool,
}

impl SearchResult {
    /// Result carrying whatever the strategy matched.
    ///
    /// `empty` stays `false` even when nothing matched: a fallback search
    /// that found nothing is just an empty list for the grid, not the
    /// authoritative AI "no matches" outcome. Only
    /// [`authoritative_empty`](Self::authoritative_empty) raises the flag.
    pub fn with_products(products: Vec<Product>, source: SearchSource) -> Self {
        Self {
            products,
            source,
            empty: false,
        }
    }

    /// Whole-catalog result for the clear-search and show-all cases.
    ///
    /// `empty` stays `false` even for an empty catalog: nothing was filtered
    /// out, so there is no "no results" message to show.
    pub fn whole_catalog(products: Vec<Product>) -> Self {
        Self {
            products,
            source: SearchSource::Fallback,
            empty: false,
        }
    }

    /// Authoritative "no matches" reported by an AI path.
    pub fn authoritative_empty(source: SearchSource) -> Self {
        Self {
            products: Vec::new(),
            source,
            empty: true,
        }
    }
}
