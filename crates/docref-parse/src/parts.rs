//! Part enumeration: per-file sequence numbers for resolved citations.

use std::collections::HashMap;

use crate::ResolvedCitation;

/// Assign each citation a 1-based `part_index` counting how many
/// citations with the same `filepath` precede it in the list, plus one.
/// An absent filepath counts as its own key. Mutates in place; call once
/// per resolved list.
pub fn enumerate_parts(citations: &mut [ResolvedCitation]) {
    let mut seen: HashMap<Option<String>, u32> = HashMap::new();

    for citation in citations.iter_mut() {
        let count = seen.entry(citation.filepath.clone()).or_insert(0);
        *count += 1;
        citation.part_index = Some(*count);
    }
}
