//! Line-number gutter for the rendered window.

use std::fmt;

use serde::Serialize;

use super::chunk::Window;
use super::render::Rendered;
use crate::document::Document;

/// One gutter entry, aligned with one rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LineLabel {
    /// 1-based line number in the full document.
    Number(usize),
    /// Sentinel or padding line; shown blank.
    Placeholder,
}

impl fmt::Display for LineLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Placeholder => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LineNumberProjector;

impl LineNumberProjector {
    /// 1-based document line of the window's first content line.
    ///
    /// The rope keeps a line index, so this is a log-time lookup rather than
    /// a scan of the prefix.
    pub fn start_line_number(doc: &Document, window: &Window) -> usize {
        1 + doc.line_of(window.start())
    }

    pub fn project(doc: &Document, window: &Window, rendered: &Rendered) -> Vec<LineLabel> {
        let first = Self::start_line_number(doc, window);
        let content_lines = window.buffer().line_count();
        let padding = |present: bool| if present { 2 } else { 0 };
        let top = padding(window.has_previous());
        let bottom = padding(window.has_next());

        let mut labels = Vec::with_capacity(top + content_lines + bottom);
        labels.extend(std::iter::repeat_n(LineLabel::Placeholder, top));
        labels.extend((first..first + content_lines).map(LineLabel::Number));
        labels.extend(std::iter::repeat_n(LineLabel::Placeholder, bottom));

        debug_assert_eq!(labels.len(), rendered.text.split('\n').count());
        labels
    }

    /// Right-aligned gutter strings, all the same width.
    pub fn gutter(labels: &[LineLabel]) -> Vec<String> {
        let width = labels
            .iter()
            .filter_map(|label| match label {
                LineLabel::Number(n) => Some(n.to_string().len()),
                LineLabel::Placeholder => None,
            })
            .max()
            .unwrap_or(1);
        labels
            .iter()
            .map(|label| format!("{:>width$}", label.to_string()))
            .collect()
    }
}
