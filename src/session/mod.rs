//! The editing session: one open document, its active window, and everything
//! hanging off it.
//!
//! All mutation happens through `&mut Session`, so whoever owns the session is
//! the single writer. Offsets passed in and out of the session are char
//! offsets into [`Session::rendered`] text unless a method says otherwise.

pub mod debounce;
pub mod io;
mod navigation;

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

pub use debounce::Debouncer;
pub use navigation::NavRequest;

use self::io::{IoWorker, WriteJob, WriteOutcome, hash_bytes};
use crate::clock::{Clock, SystemClock};
use crate::config::EditorConfig;
use crate::document::{ChunkingMode, Document};
use crate::error::{EditorError, Result, StateError};
use crate::highlight::{self, HighlightSpan, Highlighter};
use crate::history::{History, Snapshot};
use crate::store::FileStore;
use crate::window::{
    ChunkManager, CursorGuard, LineLabel, LineNumberProjector, Rendered, Window, WindowRenderer,
};

/// An edit reported by the text surface, in rendered offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditDelta {
    Insert { at: usize, text: String },
    Delete { range: Range<usize> },
}

/// Snapshot of session state for status lines and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub path: PathBuf,
    pub mode: ChunkingMode,
    pub part: usize,
    pub total_parts: usize,
    /// 1-based document line of the first content line.
    pub first_line: usize,
    pub line_count: usize,
    pub size_bytes: usize,
    pub dirty: bool,
    pub can_undo: bool,
    pub can_redo: bool,
}

struct OpenDocument {
    generation: u64,
    doc: Document,
    window: Window,
    rendered: Rendered,
    labels: Vec<LineLabel>,
    spans: Vec<HighlightSpan>,
    cursor: usize,
    history: History,
    extension: Option<String>,
    highlight_timer: Debouncer,
    autosave_timer: Debouncer,
    /// Bumped on every change to the content.
    revision: u64,
    /// Hash of what is on disk, as far as this session knows.
    saved_hash: u64,
    /// Hash of an auto-save still in flight.
    pending_hash: Option<u64>,
    dirty: bool,
}

impl OpenDocument {
    /// Cursor as an absolute char offset in the document.
    fn absolute_cursor(&self) -> usize {
        self.window.start() + self.rendered.to_content_offset(self.cursor)
    }

    /// Rendered offset for an absolute document offset, clamped to the window.
    fn rendered_offset(&self, absolute: usize) -> usize {
        let within = absolute
            .saturating_sub(self.window.start())
            .min(self.window.buffer().len_chars());
        self.rendered.content.start + within
    }

    /// The whole text with the window's edits applied, without merging.
    fn merged_text(&self) -> String {
        if !self.window.buffer().is_dirty() {
            return self.doc.text();
        }
        let bounds = self.window.bounds();
        let mut text = self.doc.slice(0..bounds.start);
        text.push_str(&self.window.content());
        text.push_str(&self.doc.slice(bounds.end..self.doc.len_chars()));
        text
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            text: self.merged_text(),
            anchor: self.window.start(),
            cursor: self.absolute_cursor(),
        }
    }

    /// Rebuild everything derived from the window content.
    fn refresh_view(&mut self) {
        self.rendered = WindowRenderer::render(&self.window);
        self.labels = LineNumberProjector::project(&self.doc, &self.window, &self.rendered);
        self.cursor = CursorGuard::guard(&self.rendered, self.cursor);
    }

    fn rehighlight(&mut self, highlighter: &Highlighter, enabled: bool) {
        self.highlight_timer.cancel();
        self.spans = match (&self.extension, enabled) {
            (Some(ext), true) => {
                let content = self.window.content();
                let spans = highlighter.highlight(&content, ext);
                highlight::to_char_ranges(&content, &spans, self.rendered.content.start)
            }
            _ => Vec::new(),
        };
    }

    fn mark_changed(&mut self, now_ms: u64, autosave: bool) {
        self.revision += 1;
        self.dirty = true;
        self.spans.clear();
        self.highlight_timer.queue(now_ms);
        if autosave {
            self.autosave_timer.queue(now_ms);
        }
    }

    fn apply_outcome(&mut self, outcome: WriteOutcome) {
        if self.pending_hash == Some(outcome.hash) {
            self.pending_hash = None;
        }
        match outcome.result {
            Ok(()) => {
                self.saved_hash = outcome.hash;
                if outcome.revision == self.revision {
                    self.dirty = false;
                }
                tracing::debug!(path = %outcome.path.display(), "background save finished");
            }
            Err(err) => {
                tracing::warn!(path = %outcome.path.display(), %err, "background save failed");
            }
        }
    }
}

/// One editing session. At most one document is open at a time.
pub struct Session {
    store: Arc<dyn FileStore>,
    config: EditorConfig,
    clock: Arc<dyn Clock>,
    chunks: ChunkManager,
    highlighter: Highlighter,
    io: Option<IoWorker>,
    next_generation: u64,
    active: Option<OpenDocument>,
}

impl Session {
    pub fn new(store: Arc<dyn FileStore>, config: EditorConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            chunks: ChunkManager::new(&config),
            highlighter: Highlighter::new(),
            store,
            config,
            clock,
            io: None,
            next_generation: 1,
            active: None,
        }
    }

    pub fn with_system_clock(store: Arc<dyn FileStore>, config: EditorConfig) -> Self {
        Self::new(store, config, Arc::new(SystemClock::new()))
    }

    pub const fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub const fn is_open(&self) -> bool {
        self.active.is_some()
    }

    fn active(&self) -> Result<&OpenDocument> {
        self.active
            .as_ref()
            .ok_or(EditorError::State(StateError::NoActiveDocument))
    }

    fn active_mut(&mut self) -> Result<&mut OpenDocument> {
        self.active
            .as_mut()
            .ok_or(EditorError::State(StateError::NoActiveDocument))
    }

    /// Open `path`, closing whatever was open before.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if self.active.is_some() {
            self.close()?;
        }
        let bytes = self
            .store
            .read(path)
            .map_err(|err| EditorError::io(path, err))?;
        let doc = Document::from_bytes(path, &bytes, &self.config);
        let window = self.chunks.compute_window(&doc, 0);
        let rendered = WindowRenderer::render(&window);
        let labels = LineNumberProjector::project(&doc, &window, &rendered);
        let generation = self.next_generation;
        self.next_generation += 1;

        tracing::debug!(
            path = %path.display(),
            mode = ?doc.mode(),
            chars = doc.len_chars(),
            lines = doc.line_count(),
            parts = window.total_parts(),
            "opened document"
        );

        let mut open = OpenDocument {
            generation,
            saved_hash: hash_bytes(doc.text().as_bytes()),
            extension: highlight::extension_of(path),
            history: History::new(&self.config),
            cursor: CursorGuard::guard(&rendered, 0),
            doc,
            window,
            rendered,
            labels,
            spans: Vec::new(),
            highlight_timer: Debouncer::new(self.config.highlight_debounce_ms),
            autosave_timer: Debouncer::new(self.config.autosave_debounce_ms),
            revision: 0,
            pending_hash: None,
            dirty: false,
        };
        open.rehighlight(&self.highlighter, self.config.highlight);
        self.active = Some(open);
        Ok(())
    }

    /// Merge and write the document now, blocking until the writer reports
    /// back. Failures are returned to the caller.
    pub fn save(&mut self) -> Result<()> {
        self.active()?;
        self.wait_for_io();
        let chunks = self.chunks;
        let open = self.active_mut()?;
        open.autosave_timer.cancel();
        chunks.merge_window(&mut open.doc, &mut open.window);
        let bytes = open.doc.text().into_bytes();
        let job = WriteJob {
            generation: open.generation,
            revision: open.revision,
            path: open.doc.path().to_path_buf(),
            hash: hash_bytes(&bytes),
            bytes,
        };
        let path = job.path.clone();
        let hash = job.hash;
        let len = job.bytes.len();

        self.write_and_wait(job)
            .map_err(|err| EditorError::io(&path, err))?;
        let open = self.active_mut()?;
        open.saved_hash = hash;
        open.dirty = false;
        tracing::debug!(path = %path.display(), bytes = len, "saved");
        Ok(())
    }

    /// Merge, flush if dirty, and close. On a failed flush the document stays
    /// open so nothing is lost.
    pub fn close(&mut self) -> Result<()> {
        let open = self.active_mut()?;
        open.highlight_timer.cancel();
        open.autosave_timer.cancel();
        self.wait_for_io();
        let open = self.active()?;
        if open.dirty || open.window.buffer().is_dirty() {
            self.save()?;
        }
        if let Some(open) = self.active.take() {
            tracing::debug!(path = %open.doc.path().display(), "closed document");
        }
        Ok(())
    }

    /// The full document with the window's edits applied.
    pub fn current_text(&self) -> Result<String> {
        Ok(self.active()?.merged_text())
    }

    pub fn rendered(&self) -> Result<&Rendered> {
        Ok(&self.active()?.rendered)
    }

    pub fn cursor(&self) -> Result<usize> {
        Ok(self.active()?.cursor)
    }

    /// Move the cursor; returns where it actually landed.
    pub fn set_cursor(&mut self, offset: usize) -> Result<usize> {
        let open = self.active_mut()?;
        open.cursor = CursorGuard::guard(&open.rendered, offset);
        Ok(open.cursor)
    }

    /// Spans over the rendered text, in char offsets. Empty while a
    /// re-highlight is pending after an edit.
    pub fn highlight_spans(&self) -> Result<&[HighlightSpan]> {
        Ok(&self.active()?.spans)
    }

    /// One label per rendered line.
    pub fn line_labels(&self) -> Result<&[LineLabel]> {
        Ok(&self.active()?.labels)
    }

    pub fn status(&self) -> Result<Status> {
        let open = self.active()?;
        Ok(Status {
            path: open.doc.path().to_path_buf(),
            mode: open.doc.mode(),
            part: open.window.part(),
            total_parts: open.window.total_parts(),
            first_line: LineNumberProjector::start_line_number(&open.doc, &open.window),
            line_count: open.doc.line_count(),
            size_bytes: open.doc.size_bytes(),
            dirty: open.dirty,
            can_undo: open.history.can_undo(),
            can_redo: open.history.can_redo(),
        })
    }

    /// Apply an edit from the text surface. Returns the new cursor.
    ///
    /// Positions inside sentinel zones are moved to the content edge first,
    /// so edits never touch sentinel text.
    pub fn on_edit(&mut self, delta: EditDelta) -> Result<usize> {
        let now = self.clock.now_ms();
        let autosave = self.config.autosave;
        let chunks = self.chunks;
        let open = self.active_mut()?;

        let content_start = open.rendered.content.start;
        let (local, text) = match delta {
            EditDelta::Insert { at, text } => {
                let at = open.rendered.to_content_offset(CursorGuard::guard(&open.rendered, at));
                (at..at, text)
            }
            EditDelta::Delete { range } => {
                let range = CursorGuard::clamp_edit_range(&open.rendered, range);
                (range.start - content_start..range.end - content_start, String::new())
            }
        };
        if local.is_empty() && text.is_empty() {
            open.cursor = content_start + local.start;
            return Ok(open.cursor);
        }

        if open.history.begin_edit(now) {
            // Snapshot before touching the buffer, window already reconciled.
            chunks.merge_window(&mut open.doc, &mut open.window);
            let snapshot = open.snapshot();
            open.history.record(snapshot);
        }

        let buffer = open.window.buffer_mut();
        buffer.remove(local.clone());
        open.cursor = content_start + buffer.insert(local.start, &text);
        open.refresh_view();
        open.mark_changed(now, autosave);
        Ok(open.cursor)
    }

    pub fn undo(&mut self) -> Result<()> {
        self.restore(true)
    }

    pub fn redo(&mut self) -> Result<()> {
        self.restore(false)
    }

    fn restore(&mut self, backwards: bool) -> Result<()> {
        let now = self.clock.now_ms();
        let autosave = self.config.autosave;
        let enabled = self.config.highlight;
        let chunks = self.chunks;
        let open = self.active.as_mut().ok_or(StateError::NoActiveDocument)?;

        chunks.merge_window(&mut open.doc, &mut open.window);
        let current = open.snapshot();
        let restored = if backwards {
            open.history.undo(current)?
        } else {
            open.history.redo(current)?
        };

        open.doc.replace_all(&restored.text);
        open.window = chunks.window_containing_offset(&open.doc, restored.anchor);
        open.refresh_view();
        open.cursor = CursorGuard::guard(&open.rendered, open.rendered_offset(restored.cursor));

        open.mark_changed(now, autosave);
        open.rehighlight(&self.highlighter, enabled);
        tracing::debug!(
            undo = backwards,
            part = open.window.part(),
            undo_depth = open.history.undo_depth(),
            redo_depth = open.history.redo_depth(),
            "restored snapshot"
        );
        Ok(())
    }

    /// Run due timers and apply finished background writes.
    pub fn tick(&mut self) {
        let now = self.clock.now_ms();
        self.drain_io(false);
        let enabled = self.config.highlight;
        let Some(open) = self.active.as_mut() else {
            return;
        };
        if open.highlight_timer.take_ready(now) {
            open.rehighlight(&self.highlighter, enabled);
        }
        if open.autosave_timer.take_ready(now) && self.config.autosave {
            self.flush_in_background();
        }
    }

    /// Milliseconds until the next timer is due, if any is pending.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        let now = self.clock.now_ms();
        let open = self.active.as_ref()?;
        [
            open.highlight_timer.remaining_ms(now),
            open.autosave_timer.remaining_ms(now),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Merge and hand the document to the writer unless that content is
    /// already saved or being saved.
    fn flush_in_background(&mut self) {
        let chunks = self.chunks;
        let Some(open) = self.active.as_mut() else {
            return;
        };
        chunks.merge_window(&mut open.doc, &mut open.window);
        let text = open.doc.text();
        let hash = hash_bytes(text.as_bytes());
        if hash == open.saved_hash || open.pending_hash == Some(hash) {
            if hash == open.saved_hash && open.pending_hash.is_none() {
                open.dirty = false;
            }
            tracing::debug!(path = %open.doc.path().display(), "content unchanged; skipping save");
            return;
        }
        let job = WriteJob {
            generation: open.generation,
            revision: open.revision,
            path: open.doc.path().to_path_buf(),
            bytes: text.into_bytes(),
            hash,
        };
        open.pending_hash = Some(hash);

        let job = match self.io_worker() {
            Some(worker) => match worker.submit(job) {
                Ok(()) => return,
                Err(job) => job,
            },
            None => job,
        };
        // No worker thread; write inline so the save still happens.
        let result = self.store.write(&job.path, &job.bytes);
        let outcome = WriteOutcome {
            generation: job.generation,
            revision: job.revision,
            path: job.path,
            hash: job.hash,
            result,
        };
        if let Some(open) = self.active.as_mut() {
            open.apply_outcome(outcome);
        }
    }

    /// Write `job` on the worker and wait for its outcome. The worker must
    /// be idle so the only outcome that comes back is this job's.
    fn write_and_wait(&mut self, job: WriteJob) -> std::io::Result<()> {
        let Some(worker) = self.io_worker() else {
            return self.store.write(&job.path, &job.bytes);
        };
        let job = match worker.submit(job) {
            Ok(()) => {
                return worker.wait_idle().pop().map_or_else(
                    || Err(std::io::Error::other("io worker stopped before the write finished")),
                    |outcome| outcome.result,
                );
            }
            Err(job) => job,
        };
        self.store.write(&job.path, &job.bytes)
    }

    fn io_worker(&mut self) -> Option<&mut IoWorker> {
        if self.io.is_none() {
            match IoWorker::spawn(Arc::clone(&self.store)) {
                Ok(worker) => self.io = Some(worker),
                Err(err) => {
                    tracing::warn!(%err, "could not start io worker; writing inline");
                    return None;
                }
            }
        }
        self.io.as_mut()
    }

    fn wait_for_io(&mut self) {
        self.drain_io(true);
    }

    fn drain_io(&mut self, block: bool) {
        let Some(worker) = self.io.as_mut() else {
            return;
        };
        let outcomes = if block {
            worker.wait_idle()
        } else {
            worker.poll()
        };
        for outcome in outcomes {
            match self.active.as_mut() {
                Some(open) if open.generation == outcome.generation => open.apply_outcome(outcome),
                _ => tracing::debug!(
                    path = %outcome.path.display(),
                    "ignoring write outcome from a closed document"
                ),
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.wait_for_io();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("open", &self.active.as_ref().map(|open| open.doc.path()))
            .finish_non_exhaustive()
    }
}
