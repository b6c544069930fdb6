//! Sentinel wrapping of window content.
//!
//! The rendered text is the only thing the text surface ever sees:
//!
//! ```text
//! PREV_SENTINEL      <- only when a previous part exists
//! (blank)
//! ...content...
//! (blank)
//! NEXT_SENTINEL      <- only when a next part exists
//! ```

use std::ops::Range;

use super::chunk::Window;

/// Marker line shown above content that has a previous part.
pub const PREV_SENTINEL: &str = "\u{25b2} \u{b7}\u{b7}\u{b7} load previous part \u{b7}\u{b7}\u{b7} \u{25b2}";
/// Marker line shown below content that has a next part.
pub const NEXT_SENTINEL: &str = "\u{25bc} \u{b7}\u{b7}\u{b7} load next part \u{b7}\u{b7}\u{b7} \u{25bc}";

/// Which sentinel a protected range belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
}

/// Cursor positions (char offsets into the rendered text) that must never
/// hold the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedRange {
    pub side: Side,
    pub range: Range<usize>,
}

impl ProtectedRange {
    pub fn contains(&self, offset: usize) -> bool {
        self.range.contains(&offset)
    }
}

/// A window as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// Char range of the window content inside `text`.
    pub content: Range<usize>,
    pub protected: Vec<ProtectedRange>,
    /// Length of `text` in chars.
    pub len_chars: usize,
}

impl Rendered {
    /// Is `offset` a position the cursor may not occupy?
    pub fn is_protected(&self, offset: usize) -> bool {
        self.protected.iter().any(|p| p.contains(offset))
    }

    /// Map a rendered offset to an offset inside the window content.
    pub fn to_content_offset(&self, offset: usize) -> usize {
        offset.clamp(self.content.start, self.content.end) - self.content.start
    }

    pub const fn has_sentinels(&self) -> bool {
        !self.protected.is_empty()
    }
}

/// Wraps window content with sentinels on the sides that have neighbours.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowRenderer;

impl WindowRenderer {
    pub fn render(window: &Window) -> Rendered {
        Self::render_parts(&window.content(), window.has_previous(), window.has_next())
    }

    pub fn render_parts(content: &str, has_previous: bool, has_next: bool) -> Rendered {
        let content_chars = content.chars().count();
        let mut text = String::with_capacity(
            content.len() + PREV_SENTINEL.len() + NEXT_SENTINEL.len() + 4,
        );
        let mut protected = Vec::new();

        if has_previous {
            text.push_str(PREV_SENTINEL);
            text.push_str("\n\n");
        }
        let content_start = if has_previous {
            PREV_SENTINEL.chars().count() + 2
        } else {
            0
        };
        if has_previous {
            protected.push(ProtectedRange {
                side: Side::Top,
                range: 0..content_start,
            });
        }

        text.push_str(content);
        let content_end = content_start + content_chars;

        let mut len_chars = content_end;
        if has_next {
            text.push_str("\n\n");
            text.push_str(NEXT_SENTINEL);
            len_chars += 2 + NEXT_SENTINEL.chars().count();
            // content_end itself stays legal: it is the end of real content.
            protected.push(ProtectedRange {
                side: Side::Bottom,
                range: content_end + 1..len_chars + 1,
            });
        }

        Rendered {
            text,
            content: content_start..content_end,
            protected,
            len_chars,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_part_has_no_sentinels() {
        let rendered = WindowRenderer::render_parts("hello", false, false);
        assert_eq!(rendered.text, "hello");
        assert_eq!(rendered.content, 0..5);
        assert!(!rendered.has_sentinels());
    }

    #[test]
    fn test_first_part_has_only_next_sentinel() {
        let rendered = WindowRenderer::render_parts("ab", false, true);
        assert_eq!(rendered.text, format!("ab\n\n{NEXT_SENTINEL}"));
        assert_eq!(rendered.content, 0..2);
        assert_eq!(rendered.protected.len(), 1);
        assert_eq!(rendered.protected[0].side, Side::Bottom);
        assert!(!rendered.is_protected(2));
        assert!(rendered.is_protected(3));
        assert!(rendered.is_protected(rendered.len_chars));
    }

    #[test]
    fn test_last_part_has_only_prev_sentinel() {
        let rendered = WindowRenderer::render_parts("ab", true, false);
        let start = PREV_SENTINEL.chars().count() + 2;
        assert!(rendered.text.starts_with(PREV_SENTINEL));
        assert!(rendered.text.ends_with("\n\nab"));
        assert_eq!(rendered.content, start..start + 2);
        assert!(rendered.is_protected(0));
        assert!(rendered.is_protected(start - 1));
        assert!(!rendered.is_protected(start));
    }

    #[test]
    fn test_middle_part_has_both_sentinels() {
        let rendered = WindowRenderer::render_parts("mid", true, true);
        assert_eq!(rendered.protected.len(), 2);
        assert_eq!(rendered.len_chars, rendered.text.chars().count());
        assert_eq!(
            rendered.text.chars().skip(rendered.content.start).take(3).collect::<String>(),
            "mid"
        );
    }

    #[test]
    fn test_to_content_offset_clamps() {
        let rendered = WindowRenderer::render_parts("abc", true, true);
        assert_eq!(rendered.to_content_offset(0), 0);
        assert_eq!(rendered.to_content_offset(rendered.content.start + 2), 2);
        assert_eq!(rendered.to_content_offset(rendered.len_chars), 3);
    }
}
