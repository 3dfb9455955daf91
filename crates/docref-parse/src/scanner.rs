//! Marker scanning: locate `[docN]` citation tokens in answer text.

use regex::Regex;

/// A single citation marker as matched in the answer text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// The exact matched substring, e.g. `[doc3]`.
    pub raw: String,
    /// The ordinal N carried by the marker. 1-based into the source
    /// citation list; `[doc0]` yields 0, which no citation occupies.
    pub ordinal: u32,
}

/// Scanner for `[docN]` markers, N being 1-3 decimal digits.
pub struct MarkerScanner {
    pattern: Regex,
}

impl MarkerScanner {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"\[doc(\d{1,3})\]").unwrap(),
        }
    }

    /// All markers in `text`, left to right, duplicates included.
    /// Returns an empty vec when no markers exist.
    pub fn scan(&self, text: &str) -> Vec<Marker> {
        self.pattern
            .captures_iter(text)
            .map(|cap| Marker {
                raw: cap[0].to_string(),
                ordinal: cap[1].parse().unwrap_or(0),
            })
            .collect()
    }
}

impl Default for MarkerScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finds_markers_in_order() {
        let scanner = MarkerScanner::new();
        let markers = scanner.scan("See [doc3] then [doc1] for details.");

        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].raw, "[doc3]");
        assert_eq!(markers[0].ordinal, 3);
        assert_eq!(markers[1].raw, "[doc1]");
        assert_eq!(markers[1].ordinal, 1);
    }

    #[test]
    fn test_duplicates_included() {
        let scanner = MarkerScanner::new();
        let markers = scanner.scan("[doc1] twice [doc1]");

        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0], markers[1]);
    }

    #[test]
    fn test_no_markers_yields_empty() {
        let scanner = MarkerScanner::new();
        assert!(scanner.scan("no citations here").is_empty());
        assert!(scanner.scan("").is_empty());
    }

    #[test]
    fn test_digit_bounds() {
        let scanner = MarkerScanner::new();

        assert_eq!(scanner.scan("[doc999]")[0].ordinal, 999);
        assert_eq!(scanner.scan("[doc42]")[0].ordinal, 42);
        // Four digits or no digits do not form a marker.
        assert!(scanner.scan("[doc1234]").is_empty());
        assert!(scanner.scan("[doc]").is_empty());
    }

    #[test]
    fn test_near_misses_ignored() {
        let scanner = MarkerScanner::new();
        assert!(scanner.scan("doc1] and [doc1 and [Doc1]").is_empty());
    }
}
