//! Editable window content.
//!
//! Provides a rope-backed buffer for the slice of the document that is
//! currently loaded into the text surface.

mod buffer;

pub use buffer::WindowBuffer;
