//! Docref Enrich: citation-info lookup for parsed answers
//!
//! Resolved citations carry a `filepath` naming the document chunk they
//! came from. A separate citation-info service can map those filepaths
//! to supplementary metadata (source URIs and the like). This crate owns
//! that boundary:
//!
//! - [`InfoClient`] issues the single batched lookup request.
//! - [`spawn_enrichment`] runs the lookup on a background task and hands
//!   back an [`EnrichmentHandle`]; the parse result itself is never
//!   touched by the task. Consumers merge via [`apply_citation_info`]
//!   when the result arrives, or never, in which case citations simply
//!   render without supplementary metadata.
//!
//! Lookup failures are logged and degrade to "no metadata"; they never
//! reach the caller as errors.

use std::collections::HashSet;
use std::time::Duration;

use docref_parse::{parse_answer, AnswerPayload, CitationInfo, ParsedAnswer, ResolvedCitation};
use reqwest::Client;
use tokio::sync::oneshot;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the citation-info service client.
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl EnrichConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs: 10,
        }
    }

    /// Load from environment variables.
    pub fn from_env() -> Result<Self, EnrichError> {
        let base_url =
            std::env::var("CITATION_INFO_BASE_URL").map_err(|_| EnrichError::NotConfigured)?;
        let timeout_secs = std::env::var("CITATION_INFO_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error("No citation-info service configured. Set CITATION_INFO_BASE_URL")]
    NotConfigured,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Citation-info service returned status {0}")]
    Status(u16),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

// ============================================================================
// Client
// ============================================================================

/// HTTP client for the citation-info service.
#[derive(Debug, Clone)]
pub struct InfoClient {
    client: Client,
    config: EnrichConfig,
}

impl InfoClient {
    pub fn new(config: EnrichConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Fetch info records for the given filepaths in one batched request.
    pub async fn fetch(&self, filepaths: &[String]) -> Result<Vec<CitationInfo>, EnrichError> {
        let url = format!("{}/api/citation-info", self.config.base_url);
        let body = serde_json::json!({ "filepaths": filepaths });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| EnrichError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EnrichError::Status(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| EnrichError::InvalidResponse(e.to_string()))
    }
}

// ============================================================================
// Merging
// ============================================================================

/// The non-absent filepaths of the resolved list, deduplicated,
/// first-seen order.
pub fn filepaths_of(citations: &[ResolvedCitation]) -> Vec<String> {
    let mut seen = HashSet::new();
    citations
        .iter()
        .filter_map(|c| c.filepath.clone())
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

/// Attach each info record to every citation whose `filepath` matches it
/// exactly. Citations without a match are left untouched.
pub fn apply_citation_info(citations: &mut [ResolvedCitation], infos: &[CitationInfo]) {
    for citation in citations.iter_mut() {
        let Some(path) = citation.filepath.as_deref() else {
            continue;
        };
        if let Some(info) = infos.iter().find(|i| i.filepath == path) {
            citation.citation_info = Some(info.clone());
        }
    }
}

// ============================================================================
// Two-phase enrichment
// ============================================================================

/// Handle to an in-flight enrichment lookup.
///
/// The lookup runs on its own task; this handle is the only way its
/// result reaches anyone. Dropping it abandons the result.
pub struct EnrichmentHandle {
    rx: oneshot::Receiver<Vec<CitationInfo>>,
}

impl EnrichmentHandle {
    /// Wait for the lookup to finish. Failures inside the task resolve
    /// to the empty list; rendering without metadata is the same as
    /// rendering before enrichment completed.
    pub async fn wait(self) -> Vec<CitationInfo> {
        self.rx.await.unwrap_or_default()
    }

    /// Poll without blocking. `None` while the lookup is still in
    /// flight.
    pub fn try_take(&mut self) -> Option<Vec<CitationInfo>> {
        self.rx.try_recv().ok()
    }
}

/// Launch a best-effort citation-info lookup for the resolved citations.
///
/// Returns immediately; the caller keeps its snapshot and merges the
/// handle's result with [`apply_citation_info`] if and when it wants to.
/// Must be called from within a tokio runtime. No retries; an in-flight
/// request is bounded only by the client timeout.
pub fn spawn_enrichment(client: InfoClient, citations: &[ResolvedCitation]) -> EnrichmentHandle {
    let filepaths = filepaths_of(citations);
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let infos = if filepaths.is_empty() {
            Vec::new()
        } else {
            match client.fetch(&filepaths).await {
                Ok(infos) => infos,
                Err(err) => {
                    tracing::warn!(error = %err, "citation-info lookup failed");
                    Vec::new()
                }
            }
        };
        // Receiver may already be gone; nothing to do then.
        let _ = tx.send(infos);
    });

    EnrichmentHandle { rx }
}

/// Parse an answer and kick off enrichment for whatever resolved.
///
/// `None` exactly when [`parse_answer`] returns `None`. The parse result
/// is complete and usable immediately; the handle delivers metadata
/// later.
pub fn parse_and_enrich(
    answer: &AnswerPayload,
    client: InfoClient,
) -> Option<(ParsedAnswer, EnrichmentHandle)> {
    let parsed = parse_answer(answer)?;
    let handle = spawn_enrichment(client, &parsed.citations);
    Some((parsed, handle))
}
