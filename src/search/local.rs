//! Local in-process inference path.
//!
//! Wraps a chat-style model runtime behind the [`ChatModel`] seam so the
//! adapter is an explicitly constructed, injectable instance rather than a
//! process-wide singleton. The adapter owns its capability state:
//! initialization is lazy, idempotent, and happens at most once per session.
//!
//! The model's reply is free text. [`extract_id_array`] is the one
//! narrowly-scoped step that touches that untrusted text: it pulls out the
//! first numeric-array substring and nothing else.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::CatalogSnapshot;
use crate::model::types::Product;
use crate::search::schema;

/// Chat-style completion seam over the in-process model runtime.
///
/// One system instruction, one user message, free text back. Implementations
/// may block; callers treat a completion as CPU-bound work.
pub trait ChatModel: Send + Sync {
    /// Identifier of the loaded model, for logs.
    fn id(&self) -> &str;

    /// Run a single completion.
    fn complete(&self, system: &str, user: &str) -> anyhow::Result<String>;
}

/// Loads the model runtime. Invoked at most once per adapter.
pub type ChatModelFactory = Box<dyn Fn() -> anyhow::Result<Arc<dyn ChatModel>> + Send + Sync>;

/// Capability state of the local inference runtime.
///
/// Written only by [`LocalInferenceAdapter::initialize`]; read by every
/// subsequent resolution.
#[derive(Debug, Clone)]
pub enum LocalModelAvailability {
    /// `initialize()` has not been called yet.
    Uninitialized,
    /// A load is in progress.
    Initializing,
    /// Model loaded; the local path may be chosen.
    Ready { model_id: String },
    /// Load failed; the local path stays disabled for the session.
    Failed { error: String },
}

impl LocalModelAvailability {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn is_initializing(&self) -> bool {
        matches!(self, Self::Initializing)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Short status label for display.
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Uninitialized => "OFF",
            Self::Initializing => "LOAD...",
            Self::Ready { .. } => "AI",
            Self::Failed { .. } => "ERR",
        }
    }

    /// One-line summary for logs and status bars.
    pub fn summary(&self) -> String {
        match self {
            Self::Uninitialized => "local model not initialized".to_string(),
            Self::Initializing => "local model loading".to_string(),
            Self::Ready { model_id } => format!("local model ready ({model_id})"),
            Self::Failed { error } => format!("local model failed ({error})"),
        }
    }
}

/// Local runtime failed to load.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("local model failed to load: {0}")]
    LoadFailed(String),
}

/// Local runtime failed during a completion.
#[derive(Debug, Error)]
pub enum InferError {
    #[error("local model is not ready")]
    NotReady,
    #[error("local model completion failed: {0}")]
    CompletionFailed(String),
    #[error("failed to serialize catalog for the prompt: {0}")]
    PromptBuild(#[from] serde_json::Error),
}

struct Inner {
    availability: LocalModelAvailability,
    model: Option<Arc<dyn ChatModel>>,
}

/// Adapter over the in-process language-model runtime.
pub struct LocalInferenceAdapter {
    factory: ChatModelFactory,
    inner: Mutex<Inner>,
}

impl LocalInferenceAdapter {
    /// Create an uninitialized adapter. Cheap: no model is loaded until
    /// [`initialize`](Self::initialize).
    pub fn new(factory: ChatModelFactory) -> Self {
        Self {
            factory,
            inner: Mutex::new(Inner {
                availability: LocalModelAvailability::Uninitialized,
                model: None,
            }),
        }
    }

    /// Current capability state.
    pub fn availability(&self) -> LocalModelAvailability {
        self.inner.lock().availability.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.inner.lock().availability.is_ready()
    }

    /// Load the model runtime.
    ///
    /// Idempotent: a call while already loaded or loading is a no-op. A load
    /// failure pins the state to `Failed` for the session; later calls report
    /// the recorded error instead of retrying.
    pub fn initialize(&self) -> Result<(), InitError> {
        {
            let mut inner = self.inner.lock();
            match &inner.availability {
                LocalModelAvailability::Ready { .. } | LocalModelAvailability::Initializing => {
                    return Ok(());
                }
                LocalModelAvailability::Failed { error } => {
                    return Err(InitError::LoadFailed(error.clone()));
                }
                LocalModelAvailability::Uninitialized => {
                    inner.availability = LocalModelAvailability::Initializing;
                }
            }
        }

        match (self.factory)() {
            Ok(model) => {
                debug!(model = model.id(), "local_model_ready");
                let mut inner = self.inner.lock();
                inner.availability = LocalModelAvailability::Ready {
                    model_id: model.id().to_string(),
                };
                inner.model = Some(model);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "local_model_init_failed");
                let message = err.to_string();
                self.inner.lock().availability = LocalModelAvailability::Failed {
                    error: message.clone(),
                };
                Err(InitError::LoadFailed(message))
            }
        }
    }

    /// Ask the model for a ranked id list for `query`.
    ///
    /// Returns only ids present in `catalog` (unknown ids are dropped). An
    /// empty list means "no AI match" and is not an error; callers fall back
    /// to substring search or report no results as they see fit.
    pub fn infer(&self, query: &str, catalog: &CatalogSnapshot) -> Result<Vec<u64>, InferError> {
        let model = self.inner.lock().model.clone().ok_or(InferError::NotReady)?;

        let system = build_system_prompt(query, catalog.products())?;
        let user = format!("Filter products based on: \"{query}\"");

        let response = model
            .complete(&system, &user)
            .map_err(|err| InferError::CompletionFailed(err.to_string()))?;

        let ids = extract_id_array(&response);
        let known = schema::filter_known_ids(&ids, catalog);
        debug!(
            model = model.id(),
            raw = ids.len(),
            kept = known.len(),
            "local_inference_done"
        );
        Ok(known)
    }
}

/// First `[digits, ...]`-shaped substring in the regex sense.
static ID_ARRAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[[\d,\s]*\]").expect("id-array pattern compiles")
});

/// Extract the first numeric-array substring from free model text.
///
/// Scans left to right and stops at the first match; later arrays in the same
/// response are ignored. No match, or a match that fails to parse, yields an
/// empty list, which callers read as "no AI match" rather than a failure.
pub fn extract_id_array(text: &str) -> Vec<u64> {
    let Some(found) = ID_ARRAY.find(text) else {
        return Vec::new();
    };
    serde_json::from_str(found.as_str()).unwrap_or_default()
}

/// Fixed system prompt: task description, catalog field legend, few-shot
/// examples mapping query intent to id patterns, and the serialized snapshot.
fn build_system_prompt(query: &str, products: &[Product]) -> Result<String, serde_json::Error> {
    let catalog_json = serde_json::to_string_pretty(products)?;
    Ok(format!(
        r#"You are an AI assistant specialized in filtering e-commerce products based on user queries.
Your task is to analyze user input and return a JSON array of product IDs that match the query.

Available product data format:
{{
  "id": number,
  "title": "string",
  "price": number,
  "description": "string",
  "category": "string",
  "image": "string"
}}

Available categories: "men's clothing", "women's clothing", "jewelery", "electronics"

Examples:
1. Query: "cheap electronics under $100"
   Response: [1, 5, 8] (IDs of electronics products under $100)

2. Query: "women's clothing for summer"
   Response: [3, 7, 12] (IDs of women's clothing items)

3. Query: "comfortable laptop for work"
   Response: [2, 9] (IDs of laptop/computer products)

4. Query: "jewelry for gifts"
   Response: [4, 6, 10] (IDs of jewelry items)

5. Query: "expensive luxury items"
   Response: [1, 3, 5] (IDs of high-priced items)

Instructions:
- Analyze the user query for intent, category, price range, and specific requirements
- Consider synonyms and related terms (e.g., "laptop" relates to electronics, "shirt" to clothing)
- For price queries, consider the actual prices of products
- Return ONLY a JSON array of matching product IDs
- If no products match, return an empty array []
- Do not include any explanation or additional text

User Query: "{query}"

Products to filter:
{catalog_json}"#
    ))
}
