use std::ops::Range;

use ropey::Rope;

/// The editable, sentinel-free content of the active window.
///
/// Offsets are char offsets into the window content, not into the full
/// document. The buffer knows nothing about where it came from; the chunk
/// manager keeps the bounds it was cut from.
pub struct WindowBuffer {
    rope: Rope,
    dirty: bool,
}

impl WindowBuffer {
    /// Create a new buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            dirty: false,
        }
    }

    /// Whether the buffer has been modified since creation or last merge.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the buffer as clean (e.g., after merging it into the document).
    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Insert `s` at char offset `at` (clamped). Returns the offset after the insert.
    pub fn insert(&mut self, at: usize, s: &str) -> usize {
        let at = at.min(self.rope.len_chars());
        if s.is_empty() {
            return at;
        }
        self.rope.insert(at, s);
        self.dirty = true;
        at + s.chars().count()
    }

    /// Remove the chars in `range` (clamped). Returns the number removed.
    pub fn remove(&mut self, range: Range<usize>) -> usize {
        let len = self.rope.len_chars();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        if start == end {
            return 0;
        }
        self.rope.remove(start..end);
        self.dirty = true;
        end - start
    }
}

impl std::fmt::Debug for WindowBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("dirty", &self.dirty)
            .finish()
    }
}
