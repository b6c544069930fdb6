use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use chunkpad::clock::ManualClock;
use chunkpad::config::EditorConfig;
use chunkpad::document::ChunkingMode;
use chunkpad::error::{EditorError, ValidationError};
use chunkpad::highlight::Category;
use chunkpad::session::{EditDelta, NavRequest, Session};
use chunkpad::store::{DirEntry, FileStore, LocalFileStore, MemoryFileStore};
use chunkpad::window::{NEXT_SENTINEL, PREV_SENTINEL};

/// Memory store that counts writes and can be told to reject them.
#[derive(Default)]
struct CountingStore {
    inner: MemoryFileStore,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
    last_writer: Mutex<Option<String>>,
}

impl CountingStore {
    fn with_file(path: &str, text: &str) -> Self {
        Self {
            inner: MemoryFileStore::new().with_file(path, text),
            ..Self::default()
        }
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl FileStore for CountingStore {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.inner.read(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut writer) = self.last_writer.lock() {
            *writer = thread::current().name().map(str::to_string);
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::StorageFull, "disk full"));
        }
        self.inner.write(path, bytes)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        self.inner.list(dir)
    }

    fn delete(&self, path: &Path) -> bool {
        self.inner.delete(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> bool {
        self.inner.rename(from, to)
    }
}

fn open_counting(name: &str, text: &str) -> (Session, Arc<CountingStore>, Arc<ManualClock>) {
    let store = Arc::new(CountingStore::with_file(name, text));
    let clock = Arc::new(ManualClock::new(0));
    let mut session = Session::new(store.clone(), EditorConfig::default(), clock.clone());
    session.open(name).unwrap();
    (session, store, clock)
}

fn open_line_mode(
    name: &str,
    text: &str,
    chunk_lines: usize,
) -> (Session, Arc<CountingStore>, Arc<ManualClock>) {
    let store = Arc::new(CountingStore::with_file(name, text));
    let clock = Arc::new(ManualClock::new(0));
    let config = EditorConfig {
        chunk_lines,
        size_threshold: usize::MAX,
        line_threshold: 1,
        ..EditorConfig::default()
    };
    let mut session = Session::new(store.clone(), config, clock.clone());
    session.open(name).unwrap();
    (session, store, clock)
}

fn numbered_lines(count: usize) -> String {
    (1..=count).map(|n| format!("line {n}\n")).collect()
}

#[test]
fn test_navigation_round_trip_preserves_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let original = numbered_lines(4000);
    std::fs::write(dir.path().join("big.txt"), &original).unwrap();

    let store = Arc::new(LocalFileStore::new(dir.path()));
    let mut session = Session::with_system_clock(store, EditorConfig::default());
    session.open("big.txt").unwrap();
    assert_eq!(session.status().unwrap().mode, ChunkingMode::Char);

    session.load_next().unwrap();
    session.load_next().unwrap();
    session.load_previous().unwrap();
    session.go_to_part(1).unwrap();
    session.go_to_line(3999).unwrap();
    session.save().unwrap();
    session.close().unwrap();

    let saved = std::fs::read_to_string(dir.path().join("big.txt")).unwrap();
    assert_eq!(saved, original);
}

#[test]
fn test_part_counts_for_both_modes() {
    let (session, _, _) = open_counting("wide.txt", &"y".repeat(25_000));
    let status = session.status().unwrap();
    assert_eq!(status.mode, ChunkingMode::Char);
    assert_eq!(status.total_parts, 3);

    let tall = vec!["a"; 1200].join("\n");
    let (session, _, _) = open_counting("tall.txt", &tall);
    let status = session.status().unwrap();
    assert_eq!(status.mode, ChunkingMode::Line);
    assert_eq!(status.line_count, 1200);
    assert_eq!(status.total_parts, 3);
}

#[test]
fn test_k_edits_undo_and_redo_exactly() {
    let (mut session, _, clock) = open_counting("a.rs", "fn main() {}\n");
    let original = session.current_text().unwrap();

    let mut states = vec![original.clone()];
    for k in 0..5 {
        clock.advance(1500);
        session
            .on_edit(EditDelta::Insert {
                at: 0,
                text: format!("// {k}\n"),
            })
            .unwrap();
        states.push(session.current_text().unwrap());
    }

    for expected in states.iter().rev().skip(1) {
        session.undo().unwrap();
        assert_eq!(&session.current_text().unwrap(), expected);
    }
    assert!(session.undo().is_err());

    for expected in states.iter().skip(1) {
        session.redo().unwrap();
        assert_eq!(&session.current_text().unwrap(), expected);
    }
    assert!(session.redo().is_err());
}

#[test]
fn test_burst_of_edits_is_one_undo_step() {
    let (mut session, _, clock) = open_counting("a.txt", "");
    for ch in ["a", "b", "c", "d"] {
        let at = session.cursor().unwrap();
        session
            .on_edit(EditDelta::Insert { at, text: ch.to_string() })
            .unwrap();
        clock.advance(300);
    }
    assert_eq!(session.current_text().unwrap(), "abcd");
    session.undo().unwrap();
    assert_eq!(session.current_text().unwrap(), "");
}

#[test]
fn test_edit_after_undo_drops_redo_branch() {
    let (mut session, _, clock) = open_counting("a.txt", "base");
    session
        .on_edit(EditDelta::Insert { at: 4, text: "1".to_string() })
        .unwrap();
    session.undo().unwrap();
    clock.advance(10);
    session
        .on_edit(EditDelta::Insert { at: 4, text: "2".to_string() })
        .unwrap();
    assert!(!session.status().unwrap().can_redo);
    assert!(session.redo().is_err());
    assert_eq!(session.current_text().unwrap(), "base2");
}

#[test]
fn test_undo_across_windows_restores_anchor() {
    let (mut session, _, clock) = open_counting("big.txt", &"x\n".repeat(6000));
    session.load_next().unwrap();
    let at = session.rendered().unwrap().content.start;
    session
        .on_edit(EditDelta::Insert { at, text: "TAIL".to_string() })
        .unwrap();
    clock.advance(5000);
    session.go_to_part(1).unwrap();

    session.undo().unwrap();
    let status = session.status().unwrap();
    assert_eq!(status.part, 2, "undo reloads the window the edit was made in");
    assert!(!session.current_text().unwrap().contains("TAIL"));
}

#[test]
fn test_go_to_line_lands_on_line_start() {
    let text = numbered_lines(9000);
    let (mut session, _, _) = open_counting("lines.txt", &text);
    for n in [1, 2, 999, 1000, 4321, 8999, 9000, 9001] {
        session.go_to_line(n).unwrap();
        let rendered = session.rendered().unwrap();
        let cursor = session.cursor().unwrap();
        assert!(!rendered.is_protected(cursor));

        let after: String = rendered.text.chars().skip(cursor).take_while(|c| *c != '\n').collect();
        let expected = if n <= 9000 { format!("line {n}") } else { String::new() };
        assert_eq!(after, expected, "line {n}");
        if cursor > rendered.content.start {
            assert_eq!(rendered.text.chars().nth(cursor - 1), Some('\n'));
        }
    }
    assert!(matches!(
        session.go_to_line(9002),
        Err(EditorError::Validation(ValidationError::LineOutOfRange {
            line: 9002,
            line_count: 9001
        }))
    ));
}

#[test]
fn test_go_to_line_in_line_mode() {
    let text = vec!["row"; 1500].join("\n");
    let (mut session, _, _) = open_counting("rows.txt", &text);
    assert_eq!(session.status().unwrap().mode, ChunkingMode::Line);

    session.go_to_line(1234).unwrap();
    let status = session.status().unwrap();
    assert_eq!(status.part, 3);
    assert_eq!(status.first_line, 1001);
    let labels = session.line_labels().unwrap();
    let cursor = session.cursor().unwrap();
    let rendered = session.rendered().unwrap();
    let line_index = rendered.text.chars().take(cursor).filter(|c| *c == '\n').count();
    assert_eq!(labels[line_index].to_string(), "1234");
}

#[test]
fn test_six_thousand_line_example() {
    let (mut session, _, _) = open_counting("x.txt", &"x\n".repeat(6000));
    let status = session.status().unwrap();
    assert_eq!(status.mode, ChunkingMode::Char);
    assert_eq!(status.total_parts, 2);

    let rendered = session.rendered().unwrap();
    assert!(rendered.text.ends_with(&format!("\n\n{NEXT_SENTINEL}")));
    assert!(!rendered.text.contains(PREV_SENTINEL));

    session.load_next().unwrap();
    let rendered = session.rendered().unwrap();
    assert_eq!(
        rendered.text,
        format!("{PREV_SENTINEL}\n\n{}", "x\n".repeat(1000))
    );
    let labels = session.line_labels().unwrap();
    assert_eq!(labels[2].to_string(), "5001");
}

#[test]
fn test_go_comment_wins_over_keywords() {
    let (session, _, _) = open_counting("main.go", "// func main");
    let spans = session.highlight_spans().unwrap();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].range, 0..12);
    assert_eq!(spans[0].category, Category::Comment);
}

#[test]
fn test_spans_are_offset_past_prev_sentinel() {
    let mut text = "x\n".repeat(6000);
    text.push_str("let y = 1;");
    let (mut session, _, _) = open_counting("tail.rs", &text);
    session.load_next().unwrap();

    let rendered = session.rendered().unwrap().clone();
    let spans = session.highlight_spans().unwrap();
    let keyword = spans
        .iter()
        .find(|span| span.category == Category::Keyword)
        .unwrap();
    let tagged: String = rendered
        .text
        .chars()
        .skip(keyword.range.start)
        .take(keyword.range.len())
        .collect();
    assert_eq!(tagged, "let");
    assert!(keyword.range.start >= rendered.content.start);
}

#[test]
fn test_edit_in_window_leaves_outside_bytes_alone() {
    let original: String = (0..30_000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
    let (mut session, store, _) = open_counting("alpha.txt", &original);
    session.go_to_part(2).unwrap();

    let start = session.rendered().unwrap().content.start;
    session
        .on_edit(EditDelta::Delete { range: start + 100..start + 400 })
        .unwrap();
    session
        .on_edit(EditDelta::Insert { at: start + 50, text: "EDIT".to_string() })
        .unwrap();
    session.save().unwrap();

    let saved = store.inner.contents("alpha.txt").unwrap();
    assert_eq!(&saved[..10_000], &original[..10_000]);
    assert_eq!(&saved[saved.len() - 10_000..], &original[20_000..]);
    assert_eq!(saved.len(), original.len() - 300 + 4);
}

#[test]
fn test_explicit_save_failure_surfaces() {
    let (mut session, store, _) = open_counting("a.txt", "abc");
    session
        .on_edit(EditDelta::Insert { at: 0, text: "z".to_string() })
        .unwrap();
    store.fail_writes.store(true, Ordering::SeqCst);

    let err = session.save().unwrap_err();
    assert!(matches!(err, EditorError::Io { .. }));
    assert!(session.status().unwrap().dirty);
    assert_eq!(session.current_text().unwrap(), "zabc");
}

#[test]
fn test_explicit_save_writes_on_io_thread() {
    let (mut session, store, _) = open_counting("a.txt", "abc");
    session
        .on_edit(EditDelta::Insert { at: 3, text: "d".to_string() })
        .unwrap();
    session.save().unwrap();

    assert_eq!(store.inner.contents("a.txt").as_deref(), Some("abcd"));
    assert_eq!(store.writes(), 1);
    assert_eq!(store.last_writer.lock().unwrap().as_deref(), Some("chunkpad-io"));
}

#[test]
fn test_line_mode_edit_navigate_undo_redo_and_save() {
    let original = "l1\nl2\nl3\nl4\nl5\nl6\nl7\nl8\nl9";
    let (mut session, store, clock) = open_line_mode("rows.txt", original, 3);
    assert_eq!(session.status().unwrap().mode, ChunkingMode::Line);
    assert_eq!(session.status().unwrap().total_parts, 3);

    session.go_to_part(2).unwrap();
    let at = session.rendered().unwrap().content.start;
    session
        .on_edit(EditDelta::Insert { at, text: "X\nY\n".to_string() })
        .unwrap();
    let first_edit = "l1\nl2\nl3\nX\nY\nl4\nl5\nl6\nl7\nl8\nl9";
    assert_eq!(session.current_text().unwrap(), first_edit);

    // Two more lines push the window boundaries down.
    clock.advance(5000);
    session.load_next().unwrap();
    let status = session.status().unwrap();
    assert_eq!((status.part, status.total_parts), (3, 4));
    let at = session.rendered().unwrap().content.start;
    session
        .on_edit(EditDelta::Insert { at, text: "Z".to_string() })
        .unwrap();
    let second_edit = "l1\nl2\nl3\nX\nY\nl4\nZl5\nl6\nl7\nl8\nl9";
    assert_eq!(session.current_text().unwrap(), second_edit);

    session.undo().unwrap();
    assert_eq!(session.current_text().unwrap(), first_edit);
    session.undo().unwrap();
    assert_eq!(session.current_text().unwrap(), original);
    session.redo().unwrap();
    assert_eq!(session.current_text().unwrap(), first_edit);
    session.redo().unwrap();
    assert_eq!(session.current_text().unwrap(), second_edit);

    session.save().unwrap();
    assert_eq!(store.inner.contents("rows.txt").as_deref(), Some(second_edit));
}

#[test]
fn test_line_mode_separator_is_not_editable() {
    let (mut session, store, _) = open_line_mode("rows.txt", "l1\nl2\nl3\nl4", 2);
    let content = session.rendered().unwrap().content.clone();
    assert_eq!(session.rendered().unwrap().text.chars().nth(content.end), Some('\n'));

    // Deleting across the bottom edge only removes what is inside the window.
    session
        .on_edit(EditDelta::Delete { range: content.end - 1..content.end + 3 })
        .unwrap();
    assert_eq!(session.current_text().unwrap(), "l1\nl\nl3\nl4");
    session
        .on_edit(EditDelta::Delete { range: content.end..content.end + 3 })
        .unwrap();
    assert_eq!(session.current_text().unwrap(), "l1\nl\nl3\nl4");

    session.save().unwrap();
    assert_eq!(store.inner.contents("rows.txt").as_deref(), Some("l1\nl\nl3\nl4"));
}

#[test]
fn test_autosave_failure_is_suppressed() {
    let (mut session, store, clock) = open_counting("a.txt", "abc");
    store.fail_writes.store(true, Ordering::SeqCst);
    session
        .on_edit(EditDelta::Insert { at: 3, text: "!".to_string() })
        .unwrap();
    clock.advance(2000);
    session.tick();
    // Navigation waits for the failed write; the error never reaches us.
    assert!(matches!(
        session.navigate(NavRequest::Next),
        Err(EditorError::Validation(ValidationError::NoNextPart))
    ));
    assert!(store.writes() >= 1);
    assert!(session.status().unwrap().dirty);
    assert_eq!(session.current_text().unwrap(), "abc!");

    store.fail_writes.store(false, Ordering::SeqCst);
    session.save().unwrap();
    assert_eq!(store.inner.contents("a.txt").as_deref(), Some("abc!"));
}

#[test]
fn test_autosave_skips_identical_content() {
    let (mut session, store, clock) = open_counting("a.txt", "abc");
    session
        .on_edit(EditDelta::Insert { at: 3, text: "d".to_string() })
        .unwrap();
    session.on_edit(EditDelta::Delete { range: 3..4 }).unwrap();
    clock.advance(2000);
    session.tick();
    session.save().unwrap();
    // Only the explicit save wrote; the auto-save saw nothing new.
    assert_eq!(store.writes(), 1);
    assert!(!session.status().unwrap().dirty);
}

#[test]
fn test_autosave_writes_once_per_change() {
    let (mut session, store, clock) = open_counting("a.txt", "abc");
    session
        .on_edit(EditDelta::Insert { at: 0, text: "1".to_string() })
        .unwrap();
    clock.advance(2000);
    session.tick();
    clock.advance(5000);
    session.tick();
    session.close().unwrap();
    assert_eq!(store.writes(), 1);
    assert_eq!(store.inner.contents("a.txt").as_deref(), Some("1abc"));
}

#[test]
fn test_close_cancels_timers() {
    let (mut session, store, clock) = open_counting("a.txt", "abc");
    session
        .on_edit(EditDelta::Insert { at: 0, text: "1".to_string() })
        .unwrap();
    assert!(session.next_deadline_ms().is_some());
    session.close().unwrap();
    assert_eq!(session.next_deadline_ms(), None);

    let writes = store.writes();
    clock.advance(10_000);
    session.tick();
    assert_eq!(store.writes(), writes);
}

#[test]
fn test_switching_files_flushes_previous() {
    let store = Arc::new(
        MemoryFileStore::new()
            .with_file("one.txt", "first")
            .with_file("two.txt", "second"),
    );
    let mut session = Session::new(
        store.clone(),
        EditorConfig::default(),
        Arc::new(ManualClock::new(0)),
    );
    session.open("one.txt").unwrap();
    session
        .on_edit(EditDelta::Insert { at: 5, text: "!".to_string() })
        .unwrap();
    session.open("two.txt").unwrap();

    assert_eq!(store.contents("one.txt").as_deref(), Some("first!"));
    assert_eq!(session.current_text().unwrap(), "second");
    assert!(!session.status().unwrap().can_undo);
}
