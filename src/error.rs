//! Error taxonomy for the editing engine.
//!
//! Expected conditions (a bad line number, an empty undo stack) are returned as
//! values of these types. Only [`EditorError::Io`] represents a genuine failure.

use std::path::PathBuf;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, EditorError>;

/// Every error the editing engine can produce.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// The request was well-formed but outside the valid range.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Reading or writing the document failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The operation is not possible in the current session state.
    #[error(transparent)]
    State(#[from] StateError),
}

impl EditorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by the request rather than by the environment.
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Out-of-range or malformed navigation and search requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("line {line} is outside 1..={line_count}")]
    LineOutOfRange { line: usize, line_count: usize },

    #[error("part {part} is outside 1..={total_parts}")]
    PartOutOfRange { part: usize, total_parts: usize },

    #[error("already at the first part")]
    NoPreviousPart,

    #[error("already at the last part")]
    NoNextPart,

    #[error("search term is empty")]
    EmptySearchTerm,
}

/// Operations attempted in a state that does not allow them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("no document is open")]
    NoActiveDocument,

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("nothing to redo")]
    NothingToRedo,

    #[error("the editor queue has stopped")]
    QueueClosed,
}
