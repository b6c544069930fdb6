//! Windowing over large documents.
//!
//! - [`ChunkManager`]: window boundaries and merge-back
//! - [`WindowRenderer`]: sentinel wrapping and protected ranges
//! - [`CursorGuard`]: relocation out of protected zones
//! - [`LineNumberProjector`]: gutter labels for the rendered window

mod chunk;
mod guard;
mod lines;
mod render;

pub use chunk::{ChunkManager, Window};
pub use guard::CursorGuard;
pub use lines::{LineLabel, LineNumberProjector};
pub use render::{NEXT_SENTINEL, PREV_SENTINEL, ProtectedRange, Rendered, Side, WindowRenderer};
