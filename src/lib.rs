// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. window::WindowRenderer)
    clippy::module_name_repetitions
)]

//! # Chunkpad
//!
//! A windowed editing engine for documents larger than the text surface that
//! edits them.
//!
//! Chunkpad keeps the whole document in a rope and hands the surface one
//! window at a time:
//! - Windows are cut by char count or by line count, chosen once at open
//! - "Load previous/next" sentinels are embedded in the editable text
//! - The cursor and edits are kept out of the sentinels
//! - Edits are merged back before every navigation, save and snapshot
//! - Undo/redo is time-coalesced and survives window changes
//!
//! ## Architecture
//!
//! A [`Document`](document::Document) and its active
//! [`Window`](window::Window) form a value pair with explicit render and
//! merge steps. The [`Session`](session::Session) owns both and is the only
//! thing that mutates them; [`App`](app::App) puts a session on its own
//! thread and feeds it messages.
//!
//! ## Modules
//!
//! - [`document`]: Canonical text and chunking mode
//! - [`editor`]: Editable window buffer
//! - [`window`]: Chunking, sentinels, cursor guard, line numbers
//! - [`history`]: Coalesced undo/redo
//! - [`highlight`]: Regex span tagging
//! - [`search`]: Literal search
//! - [`session`]: Editing session and navigation
//! - [`app`]: Editor queue thread
//! - [`store`]: File storage
//! - [`remote`]: Bulk push/pull to a remote repository

pub mod app;
pub mod clock;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod highlight;
pub mod history;
pub mod remote;
pub mod search;
pub mod session;
pub mod store;
pub mod window;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Outcome};
    pub use crate::config::EditorConfig;
    pub use crate::document::{ChunkingMode, Document};
    pub use crate::error::{EditorError, Result};
    pub use crate::session::{EditDelta, NavRequest, Session};
    pub use crate::store::{FileStore, LocalFileStore, MemoryFileStore};
}
