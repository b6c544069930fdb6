use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tuning knobs for windowing, history and timers.
///
/// A single value of this type is injected into the session; nothing in the
/// crate reads settings from anywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Documents above this many chars are windowed by char offset.
    pub size_threshold: usize,
    /// Documents with at least this many lines are windowed by line.
    pub line_threshold: usize,
    /// Window length in chars for char-mode documents.
    pub chunk_size: usize,
    /// Window length in lines for line-mode documents.
    pub chunk_lines: usize,
    pub history_capacity: usize,
    /// Edits closer together than this share one undo step.
    pub coalesce_ms: u64,
    pub highlight_debounce_ms: u64,
    pub autosave_debounce_ms: u64,
    pub autosave: bool,
    pub highlight: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            size_threshold: 10_000,
            line_threshold: 1_000,
            chunk_size: 10_000,
            chunk_lines: 500,
            history_capacity: 50,
            coalesce_ms: 1_000,
            highlight_debounce_ms: 2_000,
            autosave_debounce_ms: 2_000,
            autosave: true,
            highlight: true,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub chunk_size: Option<usize>,
    pub chunk_lines: Option<usize>,
    pub size_threshold: Option<usize>,
    pub line_threshold: Option<usize>,
    pub history_capacity: Option<usize>,
    pub no_autosave: bool,
    pub no_highlight: bool,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            chunk_size: other.chunk_size.or(self.chunk_size),
            chunk_lines: other.chunk_lines.or(self.chunk_lines),
            size_threshold: other.size_threshold.or(self.size_threshold),
            line_threshold: other.line_threshold.or(self.line_threshold),
            history_capacity: other.history_capacity.or(self.history_capacity),
            no_autosave: self.no_autosave || other.no_autosave,
            no_highlight: self.no_highlight || other.no_highlight,
        }
    }

    /// Apply these flags on top of `base`. Zero sizes are ignored.
    pub fn apply(&self, base: EditorConfig) -> EditorConfig {
        let positive = |v: Option<usize>| v.filter(|n| *n > 0);
        EditorConfig {
            chunk_size: positive(self.chunk_size).unwrap_or(base.chunk_size),
            chunk_lines: positive(self.chunk_lines).unwrap_or(base.chunk_lines),
            size_threshold: self.size_threshold.unwrap_or(base.size_threshold),
            line_threshold: positive(self.line_threshold).unwrap_or(base.line_threshold),
            history_capacity: positive(self.history_capacity).unwrap_or(base.history_capacity),
            autosave: base.autosave && !self.no_autosave,
            highlight: base.highlight && !self.no_highlight,
            ..base
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("chunkpad").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("chunkpad")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("chunkpad").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("chunkpad")
                .join("config");
        }
    }

    PathBuf::from(".chunkpadrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".chunkpadrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# chunkpad defaults (saved with --save)".to_string()];
    let numeric = [
        ("--chunk-size", flags.chunk_size),
        ("--chunk-lines", flags.chunk_lines),
        ("--size-threshold", flags.size_threshold),
        ("--line-threshold", flags.line_threshold),
        ("--history-capacity", flags.history_capacity),
    ];
    for (name, value) in numeric {
        if let Some(value) = value {
            lines.push(format!("{name} {value}"));
        }
    }
    if flags.no_autosave {
        lines.push("--no-autosave".to_string());
    }
    if flags.no_highlight {
        lines.push("--no-highlight".to_string());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        if token == "--no-autosave" {
            flags.no_autosave = true;
        } else if token == "--no-highlight" {
            flags.no_highlight = true;
        } else if let Some((name, inline)) = split_numeric_flag(token) {
            let value = match inline {
                Some(value) => value.parse().ok(),
                None => {
                    let next = tokens.get(i + 1).and_then(|v| v.parse().ok());
                    if next.is_some() {
                        i += 1;
                    }
                    next
                }
            };
            if let Some(value) = value {
                match name {
                    "--chunk-size" => flags.chunk_size = Some(value),
                    "--chunk-lines" => flags.chunk_lines = Some(value),
                    "--size-threshold" => flags.size_threshold = Some(value),
                    "--line-threshold" => flags.line_threshold = Some(value),
                    _ => flags.history_capacity = Some(value),
                }
            }
        }
        i += 1;
    }
    flags
}

const NUMERIC_FLAGS: &[&str] = &[
    "--chunk-size",
    "--chunk-lines",
    "--size-threshold",
    "--line-threshold",
    "--history-capacity",
];

fn split_numeric_flag(token: &str) -> Option<(&'static str, Option<&str>)> {
    NUMERIC_FLAGS.iter().find_map(|name| {
        if token == *name {
            Some((*name, None))
        } else {
            token
                .strip_prefix(name)
                .and_then(|rest| rest.strip_prefix('='))
                .map(|value| (*name, Some(value)))
        }
    })
}
