//! Moving the active window around the document.
//!
//! Every move runs the same pipeline: wait for in-flight writes, merge the
//! current window, cut the new one, render it, project line numbers,
//! highlight, and finally place and guard the cursor. Requests are validated
//! against the document as it will be after the merge, so a rejected request
//! leaves everything as it was.

use std::ops::Range;

use serde::Deserialize;

use super::{OpenDocument, Session};
use crate::error::{Result, StateError, ValidationError};
use crate::search;
use crate::window::{ChunkManager, CursorGuard, Window};

/// Where to move the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavRequest {
    /// 1-based document line.
    Line(usize),
    /// 1-based part.
    Part(usize),
    Previous,
    Next,
}

/// Where the cursor goes once the new window is showing.
enum CursorTarget {
    ContentStart,
    ContentEnd,
    /// Absolute char offset in the document.
    Absolute(usize),
}

impl Session {
    pub fn navigate(&mut self, request: NavRequest) -> Result<()> {
        self.active()?;
        self.wait_for_io();
        let chunks = self.chunks;
        let open = self.active_mut()?;
        let (window, target) = plan(&chunks, open, request)?;
        self.show(window, target)
    }

    pub fn go_to_line(&mut self, line: usize) -> Result<()> {
        self.navigate(NavRequest::Line(line))
    }

    pub fn go_to_part(&mut self, part: usize) -> Result<()> {
        self.navigate(NavRequest::Part(part))
    }

    pub fn load_previous(&mut self) -> Result<()> {
        self.navigate(NavRequest::Previous)
    }

    pub fn load_next(&mut self) -> Result<()> {
        self.navigate(NavRequest::Next)
    }

    /// Jump to the next occurrence of `term` after the cursor, wrapping at
    /// the end. The cursor lands after the match. Returns the match as an
    /// absolute char range, or `None` when the term does not occur.
    pub fn find_next(&mut self, term: &str) -> Result<Option<Range<usize>>> {
        if term.is_empty() {
            return Err(ValidationError::EmptySearchTerm.into());
        }
        let open = self.active()?;
        let from = open.absolute_cursor();
        let found = search::next_match_after(&open.merged_text(), term, from, false)?;
        let Some(found) = found else {
            return Ok(None);
        };

        self.wait_for_io();
        let chunks = self.chunks;
        let open = self.active_mut()?;
        chunks.merge_window(&mut open.doc, &mut open.window);
        let window = chunks.window_containing_offset(&open.doc, found.start);
        self.show(window, CursorTarget::Absolute(found.end))?;
        Ok(Some(found))
    }

    /// Install `window` as the active window and rebuild the view.
    fn show(&mut self, window: Window, target: CursorTarget) -> Result<()> {
        let flush = self.config.autosave;
        let enabled = self.config.highlight;
        let open = self.active.as_mut().ok_or(StateError::NoActiveDocument)?;
        let needs_flush = open.dirty && open.pending_hash.is_none();

        open.window = window;
        open.refresh_view();
        open.rehighlight(&self.highlighter, enabled);
        let cursor = match target {
            CursorTarget::ContentStart => open.rendered.content.start,
            CursorTarget::ContentEnd => open.rendered.content.end,
            CursorTarget::Absolute(offset) => open.rendered_offset(offset),
        };
        open.cursor = CursorGuard::guard(&open.rendered, cursor);
        tracing::debug!(
            part = open.window.part(),
            total = open.window.total_parts(),
            start = open.window.start(),
            cursor = open.cursor,
            "navigated"
        );

        if flush && needs_flush {
            self.flush_in_background();
        }
        Ok(())
    }
}

/// Validate `request`, then merge and cut the target window.
fn plan(
    chunks: &ChunkManager,
    open: &mut OpenDocument,
    request: NavRequest,
) -> Result<(Window, CursorTarget)> {
    let (chars, lines) = chunks.merged_metrics(&open.doc, &open.window);
    let total = chunks.total_parts(open.doc.mode(), chars, lines);
    let part = open.window.part();
    match request {
        NavRequest::Line(line) if line == 0 || line > lines => {
            return Err(ValidationError::LineOutOfRange {
                line,
                line_count: lines,
            }
            .into());
        }
        NavRequest::Part(k) if k == 0 || k > total => {
            return Err(ValidationError::PartOutOfRange {
                part: k,
                total_parts: total,
            }
            .into());
        }
        NavRequest::Previous if part <= 1 => return Err(ValidationError::NoPreviousPart.into()),
        NavRequest::Next if part >= total => return Err(ValidationError::NoNextPart.into()),
        _ => {}
    }

    chunks.merge_window(&mut open.doc, &mut open.window);
    let doc = &open.doc;
    Ok(match request {
        NavRequest::Line(line) => (
            chunks.window_containing_line(doc, line - 1),
            CursorTarget::Absolute(doc.line_start(line - 1)),
        ),
        NavRequest::Part(k) => (chunks.window_for_part(doc, k), CursorTarget::ContentStart),
        NavRequest::Previous => (
            chunks.window_for_part(doc, part - 1),
            CursorTarget::ContentEnd,
        ),
        NavRequest::Next => (
            chunks.window_for_part(doc, part + 1),
            CursorTarget::ContentStart,
        ),
    })
}
