//! Derived fields of a post page

use chrono::{DateTime, FixedOffset};

use super::ContentBlock;

/// Reading speed used for the estimate
pub const WORDS_PER_MINUTE: usize = 200;

/// Whitespace-delimited tokens in headings and body spans.
/// Punctuation is not stripped.
pub fn count_words(content: &[ContentBlock]) -> usize {
    content
        .iter()
        .map(|block| {
            block.heading.split_whitespace().count()
                + block
                    .body
                    .iter()
                    .map(|span| span.text.split_whitespace().count())
                    .sum::<usize>()
        })
        .sum()
}

/// Minutes to read, rounded up. Empty content reads in 0 minutes.
pub fn estimate_reading_minutes(content: &[ContentBlock]) -> usize {
    count_words(content).div_ceil(WORDS_PER_MINUTE)
}

/// Whether a post changed after it was first published.
/// Compares exact instants, so a time-of-day difference counts.
pub fn is_edited(
    first_publication: Option<&DateTime<FixedOffset>>,
    last_modified: Option<&DateTime<FixedOffset>>,
) -> bool {
    first_publication != last_modified
}
