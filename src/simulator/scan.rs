//! Whole-text checks run before line classification.

use crate::result::Delimiter;

const PLACEHOLDER_MARKERS: [&str; 2] = ["failwith \"TODO\"", "failwith 'TODO'"];

/// True when the source still contains an unimplemented-function placeholder.
pub fn has_placeholder(source: &str) -> bool {
    PLACEHOLDER_MARKERS
        .iter()
        .any(|marker| source.contains(marker))
}

/// Compares raw opening and closing counts, parentheses first.
///
/// Counts include comments and string literals; there is no tokenizer behind this.
pub fn unbalanced_delimiter(source: &str) -> Option<Delimiter> {
    let count = |c: char| source.chars().filter(|&x| x == c).count();
    if count('(') != count(')') {
        Some(Delimiter::Parenthesis)
    } else if count('[') != count(']') {
        Some(Delimiter::Bracket)
    } else {
        None
    }
}
