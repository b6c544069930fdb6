use std::ops::Range;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::Result;
use crate::highlight::HighlightSpan;
use crate::session::{EditDelta, NavRequest, Session, Status};
use crate::window::LineLabel;

/// Everything the editor queue can be asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Lifecycle
    /// Open a file, closing the current one
    Open(PathBuf),
    /// Merge and write the document
    Save,
    /// Merge, flush and close
    Close,

    // Editing
    /// Apply an edit in rendered offsets
    Edit(EditDelta),
    /// Move the cursor
    SetCursor(usize),
    Undo,
    Redo,

    // Navigation
    /// Move the window
    Navigate(NavRequest),
    /// Jump to the next match of a literal term
    FindNext(String),

    /// Run due timers
    Tick,
    /// Read back the current view
    View,
}

/// Successful result of a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Cursor(usize),
    Found(Option<Range<usize>>),
    View(Box<View>),
}

/// What a text surface needs to draw the active window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View {
    pub text: String,
    pub cursor: usize,
    pub labels: Vec<LineLabel>,
    pub spans: Vec<HighlightSpan>,
    pub status: Status,
}

impl View {
    pub fn capture(session: &Session) -> Result<Self> {
        Ok(Self {
            text: session.rendered()?.text.clone(),
            cursor: session.cursor()?,
            labels: session.line_labels()?.to_vec(),
            spans: session.highlight_spans()?.to_vec(),
            status: session.status()?,
        })
    }
}

/// Apply one message to the session.
pub fn update(session: &mut Session, msg: Message) -> Result<Outcome> {
    match msg {
        Message::Open(path) => session.open(path).map(|()| Outcome::Done),
        Message::Save => session.save().map(|()| Outcome::Done),
        Message::Close => session.close().map(|()| Outcome::Done),
        Message::Edit(delta) => session.on_edit(delta).map(Outcome::Cursor),
        Message::SetCursor(offset) => session.set_cursor(offset).map(Outcome::Cursor),
        Message::Undo => session.undo().map(|()| Outcome::Done),
        Message::Redo => session.redo().map(|()| Outcome::Done),
        Message::Navigate(request) => session.navigate(request).map(|()| Outcome::Done),
        Message::FindNext(term) => session.find_next(&term).map(Outcome::Found),
        Message::Tick => {
            session.tick();
            Ok(Outcome::Done)
        }
        Message::View => View::capture(session).map(|view| Outcome::View(Box::new(view))),
    }
}
