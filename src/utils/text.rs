// src/utils/text.rs

//! Text normalization helpers.

use unicode_segmentation::UnicodeSegmentation;

/// Collapse all whitespace runs to single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max` grapheme clusters.
///
/// Grapheme-based so umlauts and combining marks are never split; always
/// succeeds.
pub fn truncate(s: &str, max: usize) -> String {
    if s.graphemes(true).count() <= max {
        return s.to_string();
    }
    s.graphemes(true).take(max).collect()
}
