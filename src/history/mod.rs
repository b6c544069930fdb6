//! Time-coalesced undo/redo.
//!
//! History stores whole-document snapshots. Edits that arrive within the
//! coalescing window of the previous edit share one undo step. The session
//! merges the active window before taking or restoring a snapshot, so the
//! stacks never see window-relative content.

use std::collections::VecDeque;

use crate::config::EditorConfig;
use crate::error::StateError;

/// A restorable editor state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Full document text, window already merged.
    pub text: String,
    /// Char offset of the window start when the snapshot was taken.
    pub anchor: usize,
    /// Absolute char offset of the cursor in the document.
    pub cursor: usize,
}

#[derive(Debug)]
pub struct History {
    undo: VecDeque<Snapshot>,
    redo: VecDeque<Snapshot>,
    capacity: usize,
    coalesce_ms: u64,
    last_edit_ms: Option<u64>,
}

impl History {
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_limits(config.history_capacity, config.coalesce_ms)
    }

    pub fn with_limits(capacity: usize, coalesce_ms: u64) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            capacity: capacity.max(1),
            coalesce_ms,
            last_edit_ms: None,
        }
    }

    /// Note an edit at `now_ms`. Returns true when the caller should record
    /// the pre-edit state as a new undo step.
    ///
    /// Only edits from the text surface come through here. Undo and redo
    /// install their snapshot directly, so a replay is never recorded.
    pub fn begin_edit(&mut self, now_ms: u64) -> bool {
        let starts_step = self
            .last_edit_ms
            .is_none_or(|last| now_ms.saturating_sub(last) > self.coalesce_ms);
        self.last_edit_ms = Some(now_ms);
        starts_step
    }

    /// Push a pre-edit snapshot and drop the redo branch.
    pub fn record(&mut self, snapshot: Snapshot) {
        self.redo.clear();
        if self.undo.back().is_some_and(|top| top.text == snapshot.text) {
            return;
        }
        push_bounded(&mut self.undo, snapshot, self.capacity);
        tracing::debug!(depth = self.undo.len(), "recorded undo step");
    }

    /// Step back. `current` is the state being left, already reconciled.
    pub fn undo(&mut self, current: Snapshot) -> Result<Snapshot, StateError> {
        let restored = self.undo.pop_back().ok_or(StateError::NothingToUndo)?;
        push_bounded(&mut self.redo, current, self.capacity);
        self.last_edit_ms = None;
        Ok(restored)
    }

    /// Step forward. `current` is the state being left, already reconciled.
    pub fn redo(&mut self, current: Snapshot) -> Result<Snapshot, StateError> {
        let restored = self.redo.pop_back().ok_or(StateError::NothingToRedo)?;
        push_bounded(&mut self.undo, current, self.capacity);
        self.last_edit_ms = None;
        Ok(restored)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }
}

fn push_bounded(stack: &mut VecDeque<Snapshot>, snapshot: Snapshot, capacity: usize) {
    stack.push_back(snapshot);
    while stack.len() > capacity {
        stack.pop_front();
    }
}
