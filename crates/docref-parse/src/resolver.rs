//! Citation resolution: deduplicate, renumber, and rewrite answer markers.

use crate::scanner::MarkerScanner;
use crate::{enumerate_parts, AnswerPayload, ParsedAnswer, ResolvedCitation};

/// Display token a marker is rewritten to, padded with spaces so it
/// stays word-separated in the surrounding markdown.
fn display_token(reindex: usize) -> String {
    format!(" ^{reindex}^ ")
}

/// Parse a generated answer into display text plus resolved citations.
///
/// Markers are processed in encounter order. The first marker carrying a
/// given ordinal claims the next display number and clones the source
/// citation into the result list; every occurrence of that exact marker
/// substring is rewritten to the same ` ^K^ ` token at that point, so
/// later duplicates need no further work. A marker whose ordinal has no
/// source citation is skipped: no rewrite, no list entry.
///
/// Returns `None` when the payload's `answer` field is not text; that is
/// the defined "nothing to parse" outcome, not an error.
pub fn parse_answer(answer: &AnswerPayload) -> Option<ParsedAnswer> {
    let text = answer.answer.as_str()?;

    let markers = MarkerScanner::new().scan(text);

    let mut working = text.to_string();
    let mut resolved: Vec<ResolvedCitation> = Vec::new();
    let mut reindex = 0usize;
    let mut dropped = 0usize;

    for marker in &markers {
        // 1-based marker ordinal -> 0-based position in the source list.
        let source = marker
            .ordinal
            .checked_sub(1)
            .and_then(|i| answer.citations.get(i as usize));
        let Some(source) = source else {
            dropped += 1;
            continue;
        };

        let id = marker.ordinal.to_string();
        if resolved.iter().any(|c| c.id == id) {
            continue;
        }

        reindex += 1;
        working = working.replace(&marker.raw, &display_token(reindex));
        resolved.push(ResolvedCitation::from_source(
            source,
            id,
            reindex.to_string(),
        ));
    }

    if dropped > 0 {
        tracing::warn!(
            dropped,
            sources = answer.citations.len(),
            "markers referenced citations outside the source list"
        );
    }

    enumerate_parts(&mut resolved);

    Some(ParsedAnswer {
        citations: resolved,
        markdown_format_text: working,
        generated_chart: answer.generated_chart.clone(),
    })
}
