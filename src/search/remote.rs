//! Remote structured-extraction path.
//!
//! One POST per resolution against the filter endpoint, which returns a
//! product array already constrained server-side by a fixed output schema.
//! Status and body handling live in [`parse_filter_response`] so the whole
//! contract is testable without a network. No retries: every failure is a
//! single attempt surfaced as a [`RemoteError`] for the resolver to absorb.

use anyhow::Context;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::catalog::CatalogSnapshot;
use crate::config::SearchConfig;
use crate::model::types::Product;
use crate::search::schema::{self, ValidationError};

/// Route of the structured-extraction endpoint, relative to the base URL.
pub const FILTER_ROUTE: &str = "/api/v1/ai/filter";

/// Caller contract violation at the endpoint boundary: a required request
/// field is missing. Returned as a `400` by the service, never recovered by
/// fallback on the server side.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("searchTerm and data is required")]
    MissingFields,
}

/// Failure of the remote filter call.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Below the adapter's length gate; the network was never touched.
    #[error("query too short for remote filtering")]
    QueryTooShort,
    /// The endpoint rejected the request as malformed (`400`).
    #[error("request rejected by the filter endpoint: {0}")]
    Config(#[from] ConfigError),
    /// Any other non-2xx status.
    #[error("filter endpoint returned status {0}")]
    Status(u16),
    /// `200` envelope with `success: false`.
    #[error("filter service reported failure: {0}")]
    Service(String),
    /// The response body was not a valid envelope.
    #[error("filter response envelope is not valid JSON: {0}")]
    MalformedEnvelope(String),
    /// The envelope's `data` failed strict schema validation.
    #[error("filter response failed validation: {0}")]
    Validation(#[from] ValidationError),
    /// Network-level failure, including the request timeout.
    #[error("network failure calling the filter endpoint: {0}")]
    Transport(String),
}

/// Request body for `POST /api/v1/ai/filter`.
///
/// Both fields are required by the boundary contract; a body missing `data`
/// entirely fails deserialization before [`validate`](Self::validate) runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRequest {
    #[serde(rename = "searchTerm")]
    pub search_term: String,
    pub data: Vec<Product>,
}

impl FilterRequest {
    /// The `400` contract: an absent or blank `searchTerm` is a
    /// [`ConfigError`]. An empty `data` array is allowed — it is present,
    /// just trivial.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_term.trim().is_empty() {
            return Err(ConfigError::MissingFields);
        }
        Ok(())
    }
}

/// Response envelope returned by the endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Interpret one HTTP exchange with the filter endpoint.
///
/// A `400` is the boundary's caller-contract violation: it is reported as
/// [`ConfigError`] directly and never reaches schema validation. A success
/// envelope goes through strict validation against the snapshot that was sent
/// with the request.
pub fn parse_filter_response(
    status: StatusCode,
    body: &str,
    catalog: &CatalogSnapshot,
) -> Result<Vec<Product>, RemoteError> {
    if status == StatusCode::BAD_REQUEST {
        return Err(RemoteError::Config(ConfigError::MissingFields));
    }
    if !status.is_success() {
        return Err(RemoteError::Status(status.as_u16()));
    }

    let envelope: FilterResponse = serde_json::from_str(body)
        .map_err(|err| RemoteError::MalformedEnvelope(err.to_string()))?;

    if !envelope.success {
        return Err(RemoteError::Service(
            envelope
                .error
                .unwrap_or_else(|| "unspecified error".to_string()),
        ));
    }

    let data = envelope
        .data
        .ok_or_else(|| RemoteError::MalformedEnvelope("missing data field".to_string()))?;

    Ok(schema::validate_products(&data, catalog)?)
}

/// Adapter over the remote structured-extraction service.
pub struct RemoteInferenceAdapter {
    client: Client,
    base_url: String,
    min_query_len: usize,
}

impl RemoteInferenceAdapter {
    /// Build the adapter and its HTTP client.
    ///
    /// The client carries the configured request timeout so an unresponsive
    /// model call surfaces as [`RemoteError::Transport`] instead of hanging
    /// the caller.
    pub fn new(base_url: impl Into<String>, config: &SearchConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(concat!("storefront-search/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building http client")?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            min_query_len: config.min_remote_len,
        })
    }

    /// Send the query and the full catalog snapshot for filtering.
    pub async fn filter(
        &self,
        query: &str,
        catalog: &CatalogSnapshot,
    ) -> Result<Vec<Product>, RemoteError> {
        let trimmed = query.trim();
        if trimmed.chars().count() < self.min_query_len {
            return Err(RemoteError::QueryTooShort);
        }

        let request = FilterRequest {
            search_term: trimmed.to_string(),
            data: catalog.to_vec(),
        };
        request.validate()?;

        let url = format!("{}{FILTER_ROUTE}", self.base_url.trim_end_matches('/'));
        debug!(url = %url, query = trimmed, products = catalog.len(), "remote_filter_start");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| RemoteError::Transport(err.to_string()))?;

        parse_filter_response(status, &body, catalog)
    }
}
