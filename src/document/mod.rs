//! Canonical document storage.
//!
//! This module handles:
//! - Holding the full text of an open file in a rope
//! - Size and line-count queries used for windowing decisions
//! - Choosing the chunking mode once, when the file is opened

use std::ops::Range;
use std::path::{Path, PathBuf};

use ropey::Rope;
use serde::Serialize;

use crate::config::EditorConfig;

/// How an open document is split into windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkingMode {
    /// The whole document fits in one window.
    None,
    /// Windows are fixed runs of chars.
    Char,
    /// Windows are fixed runs of lines.
    Line,
}

/// Pick the chunking mode for a document of the given size.
///
/// Size wins over line count: a document that is both long and large pages by
/// char offset, while one that is only long pages by line so each window stays
/// visually short.
pub const fn select_mode(chars: usize, lines: usize, config: &EditorConfig) -> ChunkingMode {
    let too_big = chars > config.size_threshold;
    let too_long = lines >= config.line_threshold;
    if too_big {
        ChunkingMode::Char
    } else if too_long {
        ChunkingMode::Line
    } else {
        ChunkingMode::None
    }
}

/// The full text of an open file. Single source of truth for its content.
#[derive(Clone)]
pub struct Document {
    path: PathBuf,
    text: Rope,
    mode: ChunkingMode,
}

impl Document {
    /// Create a document and classify it against `config`.
    pub fn new(path: impl Into<PathBuf>, text: &str, config: &EditorConfig) -> Self {
        let text = Rope::from_str(text);
        let mode = select_mode(text.len_chars(), text.len_lines(), config);
        Self {
            path: path.into(),
            text,
            mode,
        }
    }

    /// Decode raw file bytes, replacing invalid UTF-8 sequences.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: &[u8], config: &EditorConfig) -> Self {
        Self::new(path, &String::from_utf8_lossy(bytes), config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn mode(&self) -> ChunkingMode {
        self.mode
    }

    pub const fn rope(&self) -> &Rope {
        &self.text
    }

    pub fn text(&self) -> String {
        self.text.to_string()
    }

    pub fn len_chars(&self) -> usize {
        self.text.len_chars()
    }

    pub fn size_bytes(&self) -> usize {
        self.text.len_bytes()
    }

    /// Number of lines, counting the (possibly empty) line after a trailing `\n`.
    pub fn line_count(&self) -> usize {
        self.text.len_lines()
    }

    /// Char offset where 0-based `line` starts; the end of text past the last line.
    pub fn line_start(&self, line: usize) -> usize {
        if line >= self.text.len_lines() {
            self.text.len_chars()
        } else {
            self.text.line_to_char(line)
        }
    }

    /// 0-based line containing char `offset` (clamped to the text).
    pub fn line_of(&self, offset: usize) -> usize {
        self.text.char_to_line(offset.min(self.text.len_chars()))
    }

    pub fn slice(&self, range: Range<usize>) -> String {
        self.text.slice(range).to_string()
    }

    /// Replace `range` with `replacement`.
    pub(crate) fn splice(&mut self, range: Range<usize>, replacement: &str) {
        let start = range.start.min(self.text.len_chars());
        let end = range.end.clamp(start, self.text.len_chars());
        if start < end {
            self.text.remove(start..end);
        }
        if !replacement.is_empty() {
            self.text.insert(start, replacement);
        }
    }

    /// Swap in a whole new text, keeping the mode chosen at open.
    pub(crate) fn replace_all(&mut self, text: &str) {
        self.text = Rope::from_str(text);
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field(
                "text",
                &format_args!(
                    "Rope({} chars, {} lines)",
                    self.text.len_chars(),
                    self.text.len_lines()
                ),
            )
            .field("mode", &self.mode)
            .finish()
    }
}
