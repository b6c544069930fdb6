//! Window boundaries and merge-back.

use std::ops::Range;

use crate::config::EditorConfig;
use crate::document::{ChunkingMode, Document};
use crate::editor::WindowBuffer;

/// The slice of the document currently loaded for editing.
///
/// `bounds` are the char offsets the window was cut from. They only change
/// when the window is merged back, never while the buffer is being edited.
#[derive(Debug)]
pub struct Window {
    mode: ChunkingMode,
    bounds: Range<usize>,
    start_line: usize,
    part: usize,
    total_parts: usize,
    buffer: WindowBuffer,
}

impl Window {
    pub const fn mode(&self) -> ChunkingMode {
        self.mode
    }

    pub fn bounds(&self) -> Range<usize> {
        self.bounds.clone()
    }

    pub const fn start(&self) -> usize {
        self.bounds.start
    }

    /// 0-based document line containing the window start.
    pub const fn start_line(&self) -> usize {
        self.start_line
    }

    /// 1-based part index.
    pub const fn part(&self) -> usize {
        self.part
    }

    pub const fn total_parts(&self) -> usize {
        self.total_parts
    }

    pub const fn has_previous(&self) -> bool {
        self.part > 1
    }

    pub const fn has_next(&self) -> bool {
        self.part < self.total_parts
    }

    pub fn content(&self) -> String {
        self.buffer.text()
    }

    pub const fn buffer(&self) -> &WindowBuffer {
        &self.buffer
    }

    pub const fn buffer_mut(&mut self) -> &mut WindowBuffer {
        &mut self.buffer
    }
}

/// Computes windows over a document and splices edited windows back into it.
///
/// Char-mode windows tile the document exactly. Line-mode windows hold whole
/// lines, and the newline separating two parts sits between their bounds, so
/// it is never part of any window. Editing cannot remove it: the last line of
/// one part can never be joined to the first line of the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkManager {
    chunk_size: usize,
    chunk_lines: usize,
}

impl ChunkManager {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            chunk_size: config.chunk_size.max(1),
            chunk_lines: config.chunk_lines.max(1),
        }
    }

    /// Number of parts a document of this shape splits into (at least 1).
    pub const fn total_parts(&self, mode: ChunkingMode, chars: usize, lines: usize) -> usize {
        let parts = match mode {
            ChunkingMode::None => 1,
            ChunkingMode::Char => chars.div_ceil(self.chunk_size),
            ChunkingMode::Line => lines.div_ceil(self.chunk_lines),
        };
        if parts == 0 { 1 } else { parts }
    }

    pub fn parts_for(&self, doc: &Document) -> usize {
        self.total_parts(doc.mode(), doc.len_chars(), doc.line_count())
    }

    /// Window whose chunk contains `anchor`.
    ///
    /// `anchor` is a char offset in char mode and a 0-based line in line
    /// mode; it snaps down to the chunk boundary. Anchors past the end land
    /// in the last part. Unchunked documents always get the whole text.
    pub fn compute_window(&self, doc: &Document, anchor: usize) -> Window {
        let total = self.parts_for(doc);
        let part_index = match doc.mode() {
            ChunkingMode::None => 0,
            ChunkingMode::Char => anchor / self.chunk_size,
            ChunkingMode::Line => anchor / self.chunk_lines,
        };
        self.build(doc, part_index.min(total - 1), total)
    }

    /// Window for 1-based `part`, clamped into range.
    pub fn window_for_part(&self, doc: &Document, part: usize) -> Window {
        let total = self.parts_for(doc);
        self.build(doc, part.clamp(1, total) - 1, total)
    }

    pub fn window_containing_offset(&self, doc: &Document, offset: usize) -> Window {
        let offset = offset.min(doc.len_chars());
        match doc.mode() {
            ChunkingMode::Line => self.compute_window(doc, doc.line_of(offset)),
            ChunkingMode::None | ChunkingMode::Char => self.compute_window(doc, offset),
        }
    }

    /// Window containing the start of 0-based `line`.
    pub fn window_containing_line(&self, doc: &Document, line: usize) -> Window {
        match doc.mode() {
            ChunkingMode::Line => self.compute_window(doc, line),
            ChunkingMode::None | ChunkingMode::Char => {
                self.compute_window(doc, doc.line_start(line))
            }
        }
    }

    fn build(&self, doc: &Document, part_index: usize, total: usize) -> Window {
        let bounds = self.bounds_for(doc, part_index);
        Window {
            mode: doc.mode(),
            start_line: doc.line_of(bounds.start),
            part: part_index + 1,
            total_parts: total,
            buffer: WindowBuffer::from_text(&doc.slice(bounds.clone())),
            bounds,
        }
    }

    fn bounds_for(&self, doc: &Document, part_index: usize) -> Range<usize> {
        let len = doc.len_chars();
        match doc.mode() {
            ChunkingMode::None => 0..len,
            ChunkingMode::Char => {
                let start = (part_index * self.chunk_size).min(len);
                start..(start + self.chunk_size).min(len)
            }
            ChunkingMode::Line => {
                let first = part_index * self.chunk_lines;
                let last = first + self.chunk_lines;
                let start = doc.line_start(first);
                // The newline ending a line-mode window belongs to no window,
                // so every window holds exactly its own lines.
                let end = if last >= doc.line_count() {
                    len
                } else {
                    doc.line_start(last) - 1
                };
                start..end.max(start)
            }
        }
    }

    /// Splice the window's buffer back over its original bounds.
    ///
    /// Only the window's own region shifts; other chunk boundaries are not
    /// recomputed until the next navigation. Afterwards the window's bounds
    /// cover exactly its content so a repeated merge is a no-op. Returns
    /// whether the document changed.
    pub fn merge_window(&self, doc: &mut Document, window: &mut Window) -> bool {
        if !window.buffer.is_dirty() {
            return false;
        }
        let content = window.buffer.text();
        let old = window.bounds.clone();
        doc.splice(old.clone(), &content);
        let new_len = window.buffer.len_chars();
        window.bounds = old.start..old.start + new_len;
        window.buffer.mark_clean();
        tracing::debug!(
            path = %doc.path().display(),
            part = window.part,
            old_len = old.len(),
            new_len,
            "merged window"
        );
        true
    }

    /// Chars and lines the document would have after merging `window`,
    /// computed without touching either.
    pub fn merged_metrics(&self, doc: &Document, window: &Window) -> (usize, usize) {
        let bounds = window.bounds.clone();
        let removed_newlines = doc.line_of(bounds.end) - doc.line_of(bounds.start);
        let added_newlines = window.buffer.line_count() - 1;
        let chars = doc.len_chars() - bounds.len() + window.buffer.len_chars();
        let lines = doc.line_count() - removed_newlines + added_newlines;
        (chars, lines)
    }
}
