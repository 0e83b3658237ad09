//! HTTP client for the knowledge-base service.
//!
//! The knowledge base is a separate service that fuzzy-matches queries
//! against its document set. This client only speaks its `/search` endpoint;
//! indexing and scoring live on the other side of the wire.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Timeout for search calls.
const SEARCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from the knowledge-base service.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// Request failed (connection, timeout, non-success status).
    #[error("knowledge search failed: {0}")]
    RequestFailed(String),

    /// Response body could not be parsed.
    #[error("failed to parse knowledge response: {0}")]
    ParseError(String),
}

/// Result type for knowledge operations.
pub type Result<T> = std::result::Result<T, KnowledgeError>;

/// Request body of `POST /search`.
#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
}

/// One matched document.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchHit {
    /// Document title.
    #[serde(default)]
    pub title: String,

    /// Matched content excerpt.
    #[serde(default)]
    pub content: String,

    /// Fuzzy-match score (0-100).
    #[serde(default)]
    pub score: f32,
}

/// Response body of `POST /search`.
///
/// Every field defaults so a malformed body degrades to "no knowledge"
/// rather than a parse failure.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct SearchResponse {
    /// Matched documents, best first.
    #[serde(default)]
    pub results: Vec<SearchHit>,

    /// Whether any document cleared the service's own threshold.
    #[serde(default)]
    pub has_knowledge: bool,

    /// Score of the best match (0 when none).
    #[serde(default)]
    pub highest_score: f32,
}

impl SearchResponse {
    /// The degraded response used when the service cannot be reached.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Client for the knowledge-base search endpoint.
#[derive(Clone)]
pub struct KnowledgeClient {
    client: reqwest::Client,
    base_url: String,
}

impl KnowledgeClient {
    /// Create a client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Search the knowledge base for documents relevant to a query.
    pub async fn search(&self, query: &str) -> Result<SearchResponse> {
        let url = format!("{}/search", self.base_url);

        let response = self
            .client
            .post(&url)
            .timeout(SEARCH_TIMEOUT)
            .json(&SearchRequest { query })
            .send()
            .await
            .map_err(|e| KnowledgeError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KnowledgeError::RequestFailed(format!(
                "knowledge service returned {}",
                status
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| KnowledgeError::ParseError(e.to_string()))?;

        debug!(
            query = %query,
            hits = body.results.len(),
            highest_score = body.highest_score,
            "Knowledge search complete"
        );

        Ok(body)
    }
}
