//! Keeps the cursor and edits out of sentinel zones.

use std::ops::Range;

use super::render::{Rendered, Side};

/// Relocates offsets that land in protected zones.
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorGuard;

impl CursorGuard {
    /// Nearest legal cursor position for `offset`.
    ///
    /// Offsets in the top zone move to the start of content, offsets in the
    /// bottom zone move to the end of content. The result is never protected
    /// and `guard(guard(x)) == guard(x)`.
    pub fn guard(rendered: &Rendered, offset: usize) -> usize {
        let offset = offset.min(rendered.len_chars);
        match rendered.protected.iter().find(|p| p.contains(offset)) {
            Some(zone) => match zone.side {
                Side::Top => rendered.content.start,
                Side::Bottom => rendered.content.end,
            },
            None => offset,
        }
    }

    /// Confine an edit range to the content so deletions never eat a sentinel.
    pub fn clamp_edit_range(rendered: &Rendered, range: Range<usize>) -> Range<usize> {
        let start = range.start.clamp(rendered.content.start, rendered.content.end);
        let end = range.end.clamp(start, rendered.content.end);
        start..end
    }
}
