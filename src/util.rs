//! Small string helpers shared across the pipeline.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\n\r]+").unwrap());
static SPLIT_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapses runs of spaces/tabs/newlines to a single space and trims.
/// Idempotent: `inner_trim(inner_trim(s)) == inner_trim(s)`.
pub fn inner_trim(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s.trim(), " ").trim().to_string()
}

/// Word count: split on runs of whitespace, ignoring empty segments.
pub fn word_count(s: &str) -> usize {
    SPLIT_WS.split(s.trim()).filter(|w| !w.is_empty()).count()
}
