//! Docref Parse: citation marker extraction from generated answers
//!
//! A generated answer arrives as free text studded with `[docN]` markers,
//! each referencing the Nth entry of an ordered source-citation list.
//! This crate turns that pair into something a display layer can use:
//!
//! ```text
//! raw answer ──► MarkerScanner ──► CitationResolver ──► PartEnumerator
//!                 (find [docN])     (dedup, reindex,     (per-file
//!                                    rewrite text)        sequence nos.)
//! ```
//!
//! The output is a [`ParsedAnswer`]: the rewritten text with each marker
//! replaced by a display token ` ^K^ `, plus the deduplicated citation
//! list renumbered in first-appearance order. Supplementary metadata
//! lookup lives in the companion `docref-enrich` crate and attaches to
//! [`ResolvedCitation::citation_info`] after the fact.

pub mod parts;
pub mod resolver;
pub mod scanner;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use parts::enumerate_parts;
pub use resolver::parse_answer;
pub use scanner::{Marker, MarkerScanner};

// ============================================================================
// Core Types
// ============================================================================

/// Raw answer payload from the answer-generation service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerPayload {
    /// The generated answer. Upstream may hand back a non-string value
    /// here; parsing only proceeds when this is text.
    pub answer: Value,
    /// Source citations, addressed 1-based by the marker ordinals.
    #[serde(default)]
    pub citations: Vec<SourceCitation>,
    /// Chart payload generated alongside the answer, passed through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_chart: Option<String>,
    /// Upstream error string, opaque to this crate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A citation as supplied by the answer-generation service.
///
/// Only `filepath` matters to the core algorithm; everything else is
/// carried along for the display layer, with unknown fields preserved
/// in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SourceCitation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Supplementary metadata for a citation, resolved by filepath.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CitationInfo {
    pub filepath: String,
    /// URI of the original document the file was derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A deduplicated, renumbered citation ready for display.
///
/// Built from an independent copy of a [`SourceCitation`]; mutating the
/// resolved list never touches the answer payload it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResolvedCitation {
    /// Original marker ordinal as text. Unique across the resolved list;
    /// this is the deduplication key.
    pub id: String,
    /// Display ordinal as text, `"1"`, `"2"`, ... in first-appearance
    /// order across the answer text.
    pub reindex_id: String,
    /// 1-based sequence number among citations sharing this `filepath`.
    /// `None` until [`enumerate_parts`] has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_index: Option<u32>,
    /// Enrichment payload; `None` until a lookup result is merged in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_info: Option<CitationInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResolvedCitation {
    /// Clone `source` into a resolved citation carrying the given ids.
    pub fn from_source(source: &SourceCitation, id: String, reindex_id: String) -> Self {
        Self {
            id,
            reindex_id,
            part_index: None,
            citation_info: None,
            content: source.content.clone(),
            title: source.title.clone(),
            filepath: source.filepath.clone(),
            url: source.url.clone(),
            chunk_id: source.chunk_id.clone(),
            extra: source.extra.clone(),
        }
    }
}

/// Result of parsing an answer: rewritten text plus the resolved
/// citation list, in first-appearance order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedAnswer {
    pub citations: Vec<ResolvedCitation>,
    #[serde(rename = "markdownFormatText")]
    pub markdown_format_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_chart: Option<String>,
}
