//! Tests for the citation-info boundary
//!
//! The service itself is external; these tests pin down the failure
//! behavior (typed errors from the client, silent degradation from the
//! spawned task) and the two-phase handle plumbing. The unreachable
//! endpoint below refuses connections immediately, so the failure path
//! runs without any live service.

use docref_enrich::{
    parse_and_enrich, spawn_enrichment, EnrichConfig, EnrichError, InfoClient,
};
use docref_parse::{AnswerPayload, ResolvedCitation, SourceCitation};
use serde_json::json;

// Discard port; connections are refused at once.
const UNREACHABLE: &str = "http://127.0.0.1:9";

fn resolved(filepath: Option<&str>, id: &str) -> ResolvedCitation {
    let source = SourceCitation {
        filepath: filepath.map(String::from),
        ..Default::default()
    };
    ResolvedCitation::from_source(&source, id.to_string(), id.to_string())
}

// ============================================================================
// Client failure modes
// ============================================================================

#[tokio::test]
async fn test_fetch_against_unreachable_endpoint_is_network_error() {
    let client = InfoClient::new(EnrichConfig::new(UNREACHABLE));

    let result = client.fetch(&["a.md".to_string()]).await;
    assert!(matches!(result, Err(EnrichError::Network(_))));
}

// ============================================================================
// Spawned enrichment degrades silently
// ============================================================================

#[tokio::test]
async fn test_spawned_enrichment_failure_resolves_to_empty() {
    let client = InfoClient::new(EnrichConfig::new(UNREACHABLE));
    let citations = vec![resolved(Some("a.md"), "1"), resolved(Some("b.md"), "2")];

    let handle = spawn_enrichment(client, &citations);
    let infos = handle.wait().await;

    assert!(infos.is_empty());
}

#[tokio::test]
async fn test_spawned_enrichment_without_filepaths_skips_the_request() {
    let client = InfoClient::new(EnrichConfig::new(UNREACHABLE));
    let citations = vec![resolved(None, "1")];

    let handle = spawn_enrichment(client, &citations);
    assert!(handle.wait().await.is_empty());
}

#[tokio::test]
async fn test_try_take_yields_result_once_task_finished() {
    let client = InfoClient::new(EnrichConfig::new(UNREACHABLE));
    // No filepaths, so the task completes without touching the network.
    let mut handle = spawn_enrichment(client, &[]);

    // Let the spawned task run on the current-thread runtime.
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }

    assert_eq!(handle.try_take(), Some(vec![]));
}

// ============================================================================
// parse_and_enrich
// ============================================================================

#[tokio::test]
async fn test_parse_and_enrich_returns_snapshot_before_lookup_resolves() {
    let client = InfoClient::new(EnrichConfig::new(UNREACHABLE));
    let payload = AnswerPayload {
        answer: json!("See [doc1]."),
        citations: vec![SourceCitation {
            filepath: Some("a.md".to_string()),
            ..Default::default()
        }],
        generated_chart: None,
        error: None,
    };

    let (parsed, handle) = parse_and_enrich(&payload, client).expect("text answer");

    // The snapshot is complete and unenriched right away.
    assert_eq!(parsed.markdown_format_text, "See  ^1^ .");
    assert!(parsed.citations[0].citation_info.is_none());

    // The lookup fails against the unreachable endpoint and degrades.
    assert!(handle.wait().await.is_empty());
}

#[tokio::test]
async fn test_parse_and_enrich_non_text_answer_is_none() {
    let client = InfoClient::new(EnrichConfig::new(UNREACHABLE));
    let payload = AnswerPayload {
        answer: json!(["not", "text"]),
        citations: vec![],
        generated_chart: None,
        error: None,
    };

    assert!(parse_and_enrich(&payload, client).is_none());
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_from_env() {
    std::env::set_var("CITATION_INFO_BASE_URL", "http://127.0.0.1:8080/");
    std::env::set_var("CITATION_INFO_TIMEOUT_SECS", "3");

    let config = EnrichConfig::from_env().expect("configured");
    assert_eq!(config.base_url, "http://127.0.0.1:8080");
    assert_eq!(config.timeout_secs, 3);

    std::env::remove_var("CITATION_INFO_TIMEOUT_SECS");
    let config = EnrichConfig::from_env().expect("configured");
    assert_eq!(config.timeout_secs, 10);

    std::env::remove_var("CITATION_INFO_BASE_URL");
    assert!(matches!(
        EnrichConfig::from_env(),
        Err(EnrichError::NotConfigured)
    ));
}
