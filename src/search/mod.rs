//! Search functionality.
//!
//! Literal search over the merged document text with:
//! - Optional case-insensitive matching
//! - Wrap-around "next match" lookup
//!
//! Ranges are char offsets so they can be handed straight to navigation.

use std::ops::Range;

use regex::RegexBuilder;

use crate::error::ValidationError;

/// All non-overlapping matches of `term` in `text`, as char ranges.
pub fn find_all(
    text: &str,
    term: &str,
    case_insensitive: bool,
) -> Result<Vec<Range<usize>>, ValidationError> {
    if term.is_empty() {
        return Err(ValidationError::EmptySearchTerm);
    }
    let Ok(regex) = RegexBuilder::new(&regex::escape(term))
        .case_insensitive(case_insensitive)
        .build()
    else {
        // An escaped literal only fails on size limits; treat as no match.
        return Ok(Vec::new());
    };

    let mut ranges = Vec::new();
    let mut chars_before = 0;
    let mut last_byte = 0;
    for m in regex.find_iter(text) {
        chars_before += text[last_byte..m.start()].chars().count();
        let len = m.as_str().chars().count();
        ranges.push(chars_before..chars_before + len);
        chars_before += len;
        last_byte = m.end();
    }
    Ok(ranges)
}

/// First match starting at or after `offset`, wrapping to the top.
pub fn next_match_after(
    text: &str,
    term: &str,
    offset: usize,
    case_insensitive: bool,
) -> Result<Option<Range<usize>>, ValidationError> {
    let matches = find_all(text, term, case_insensitive)?;
    Ok(matches
        .iter()
        .find(|m| m.start >= offset)
        .or_else(|| matches.first())
        .cloned())
}
