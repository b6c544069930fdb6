//! Chunkpad - open a large file and print one window of it.
//!
//! # Usage
//!
//! ```bash
//! chunkpad big.log
//! chunkpad --line 52000 big.log
//! chunkpad --part 3 --json big.log
//! chunkpad --chunk-size 4000 --save big.log
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use chunkpad::app::View;
use chunkpad::config::{
    ConfigFlags, EditorConfig, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, save_config_flags,
};
use chunkpad::session::{NavRequest, Session};
use chunkpad::store::LocalFileStore;
use chunkpad::window::LineNumberProjector;

/// Open a file the way the windowed editor sees it
#[derive(Parser, Debug)]
#[command(name = "chunkpad", version, about, long_about = None)]
struct Cli {
    /// File to open
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Show the window containing this 1-based line
    #[arg(long, value_name = "N", conflicts_with = "part")]
    line: Option<usize>,

    /// Show this 1-based part
    #[arg(long, value_name = "K")]
    part: Option<usize>,

    /// Show the window containing the first match of a literal term
    #[arg(long, value_name = "TERM", conflicts_with_all = ["line", "part"])]
    find: Option<String>,

    /// Print the view as JSON
    #[arg(long)]
    json: bool,

    /// Chars per window in char mode
    #[arg(long, value_name = "N")]
    chunk_size: Option<usize>,

    /// Lines per window in line mode
    #[arg(long, value_name = "N")]
    chunk_lines: Option<usize>,

    /// Files with more chars than this are chunked by chars
    #[arg(long, value_name = "N")]
    size_threshold: Option<usize>,

    /// Files with at least this many lines are chunked by lines
    #[arg(long, value_name = "N")]
    line_threshold: Option<usize>,

    /// Undo steps to keep
    #[arg(long, value_name = "N")]
    history_capacity: Option<usize>,

    /// Disable background auto-save
    #[arg(long)]
    no_autosave: bool,

    /// Disable syntax highlighting
    #[arg(long)]
    no_highlight: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

impl Cli {
    const fn flags(&self) -> ConfigFlags {
        ConfigFlags {
            chunk_size: self.chunk_size,
            chunk_lines: self.chunk_lines,
            size_threshold: self.size_threshold,
            line_threshold: self.line_threshold,
            history_capacity: self.history_capacity,
            no_autosave: self.no_autosave,
            no_highlight: self.no_highlight,
        }
    }
}

fn print_plain(session: &Session) -> Result<()> {
    let status = session.status()?;
    let rendered = session.rendered()?;
    let gutter = LineNumberProjector::gutter(session.line_labels()?);
    println!(
        "{} | part {}/{} | {:?} | {} lines | {} bytes",
        status.path.display(),
        status.part,
        status.total_parts,
        status.mode,
        status.line_count,
        status.size_bytes,
    );
    for (label, line) in gutter.iter().zip(rendered.text.split('\n')) {
        println!("{label} | {line}");
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = cli.flags();

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let config = file_flags.union(&cli_flags).apply(EditorConfig::default());

    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }

    let store = Arc::new(LocalFileStore::new("."));
    let mut session = Session::with_system_clock(store, config);
    session
        .open(&cli.file)
        .with_context(|| format!("Failed to open {}", cli.file.display()))?;

    if let Some(line) = cli.line {
        session.navigate(NavRequest::Line(line))?;
    } else if let Some(part) = cli.part {
        session.navigate(NavRequest::Part(part))?;
    } else if let Some(term) = &cli.find
        && session.find_next(term)?.is_none()
    {
        eprintln!("No match for {term:?}");
    }

    if cli.json {
        let view = View::capture(&session)?;
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_plain(&session)?;
    }
    session.close().context("Failed to close document")
}
