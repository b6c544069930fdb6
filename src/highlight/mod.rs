//! Best-effort lexical tagging for the visible window.
//!
//! This is a handful of regexes, not a tokenizer. Rules are painted in a fixed
//! order and later rules win where they overlap: keywords, numbers, function
//! calls, strings, line comments, block comments. Known gaps: no escape
//! handling inside strings, block comments do not nest and do not span lines.

mod keywords;

use std::ops::Range;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

pub use keywords::keywords_for;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Keyword,
    String,
    Comment,
    Number,
    FunctionCall,
}

/// A tagged range. Ranges are byte offsets into the highlighted text unless
/// converted with [`to_char_ranges`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightSpan {
    pub range: Range<usize>,
    pub category: Category,
}

/// Pattern rules applied after keywords, in paint order.
///
/// A rule with a capture group tags only the group.
pub const DEFAULT_RULES: &[(&str, Category)] = &[
    (r"\b\d+\.?\d*\b", Category::Number),
    (r"\b(\w+)\(", Category::FunctionCall),
    (r#"".*?""#, Category::String),
    (r"'.*?'", Category::String),
    (r"`.*?`", Category::String),
    (r"//.*", Category::Comment),
    (r"#.*", Category::Comment),
    (r"/\*.*?\*/", Category::Comment),
];

#[derive(Debug)]
struct Rule {
    regex: Regex,
    category: Category,
}

/// Compiled highlighting rules.
///
/// If any pattern fails to compile the highlighter is degraded and tags
/// nothing, so text renders unstyled instead of failing.
#[derive(Debug)]
pub struct Highlighter {
    rules: Option<Vec<Rule>>,
}

impl Highlighter {
    pub fn new() -> Self {
        Self::from_rules(DEFAULT_RULES)
    }

    pub fn from_rules(rules: &[(&str, Category)]) -> Self {
        let compiled = rules
            .iter()
            .map(|(pattern, category)| {
                Regex::new(pattern).map(|regex| Rule {
                    regex,
                    category: *category,
                })
            })
            .collect::<Result<Vec<_>, _>>();
        match compiled {
            Ok(rules) => Self { rules: Some(rules) },
            Err(err) => {
                tracing::warn!(%err, "highlight pattern rejected; rendering unstyled");
                Self { rules: None }
            }
        }
    }

    pub const fn is_degraded(&self) -> bool {
        self.rules.is_none()
    }

    /// Tag `text` as source with the given extension (case-insensitive).
    pub fn highlight(&self, text: &str, extension: &str) -> Vec<HighlightSpan> {
        let Some(rules) = &self.rules else {
            return Vec::new();
        };
        let extension = extension.to_ascii_lowercase();
        let Some(keywords) = keywords_for(&extension) else {
            return Vec::new();
        };
        if text.is_empty() {
            return Vec::new();
        }

        let mut paint: Vec<Option<Category>> = vec![None; text.len()];
        for keyword in keywords {
            for (start, word) in text.match_indices(keyword) {
                let end = start + word.len();
                if is_token_boundary(text, start, end) {
                    paint[start..end].fill(Some(Category::Keyword));
                }
            }
        }
        for rule in rules {
            for caps in rule.regex.captures_iter(text) {
                let Some(m) = caps.get(1).or_else(|| caps.get(0)) else {
                    continue;
                };
                paint[m.range()].fill(Some(rule.category));
            }
        }
        collect_spans(&paint)
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

/// Highlight with the shared default rules.
pub fn highlight(text: &str, extension: &str) -> Vec<HighlightSpan> {
    static DEFAULT: OnceLock<Highlighter> = OnceLock::new();
    DEFAULT.get_or_init(Highlighter::new).highlight(text, extension)
}

/// Whether files with this path get highlighted.
pub fn is_supported(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| keywords_for(&ext).is_some())
}

/// Lowercase extension of `path`, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Convert byte-range spans over `text` to char ranges shifted by `offset`.
pub fn to_char_ranges(text: &str, spans: &[HighlightSpan], offset: usize) -> Vec<HighlightSpan> {
    if spans.is_empty() {
        return Vec::new();
    }
    // byte index -> char index, including the end position
    let mut char_at = vec![0usize; text.len() + 1];
    let mut chars = 0;
    for (byte, ch) in text.char_indices() {
        char_at[byte..byte + ch.len_utf8()].fill(chars);
        chars += 1;
    }
    char_at[text.len()] = chars;
    spans
        .iter()
        .map(|span| HighlightSpan {
            range: offset + char_at[span.range.start]..offset + char_at[span.range.end],
            category: span.category,
        })
        .collect()
}

fn is_token_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

fn collect_spans(paint: &[Option<Category>]) -> Vec<HighlightSpan> {
    let mut spans: Vec<HighlightSpan> = Vec::new();
    for (idx, category) in paint.iter().enumerate() {
        let Some(category) = *category else {
            continue;
        };
        match spans.last_mut() {
            Some(last) if last.range.end == idx && last.category == category => {
                last.range.end = idx + 1;
            }
            _ => spans.push(HighlightSpan {
                range: idx..idx + 1,
                category,
            }),
        }
    }
    spans
}
