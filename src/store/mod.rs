//! File storage collaborators.
//!
//! The editing core only needs "read the file" and "write it back"; the rest of
//! the trait serves the file tree and bulk sync.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A directory listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Path of the entry, `dir` joined with its name.
    pub path: PathBuf,
    pub is_dir: bool,
}

pub trait FileStore: Send + Sync {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
    fn exists(&self, path: &Path) -> bool;
    /// Immediate children of `dir`, directories first, then by name.
    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>>;
    /// Remove a file or a whole directory tree.
    fn delete(&self, path: &Path) -> bool;
    fn rename(&self, from: &Path, to: &Path) -> bool;
}

fn sort_entries(entries: &mut [DirEntry]) {
    entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.path.cmp(&b.path)));
}

/// The local filesystem, with relative paths resolved against a root.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl FileStore for LocalFileStore {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(path))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(full, bytes)
    }

    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).exists()
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(self.resolve(dir))? {
            let entry = entry?;
            entries.push(DirEntry {
                path: dir.join(entry.file_name()),
                is_dir: entry.file_type()?.is_dir(),
            });
        }
        sort_entries(&mut entries);
        Ok(entries)
    }

    fn delete(&self, path: &Path) -> bool {
        let full = self.resolve(path);
        if full.is_dir() {
            fs::remove_dir_all(full).is_ok()
        } else {
            fs::remove_file(full).is_ok()
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> bool {
        fs::rename(self.resolve(from), self.resolve(to)).is_ok()
    }
}

/// Files held in memory. Directories exist implicitly through their files.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl AsRef<[u8]>) -> Self {
        self.files().insert(path.into(), contents.as_ref().to_vec());
        self
    }

    /// Contents of `path` as UTF-8, for assertions.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files()
            .get(path.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FileStore for MemoryFileStore {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files().get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
        })
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        self.files().insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files().keys().any(|key| key.starts_with(path))
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        let files = self.files();
        let mut entries: Vec<DirEntry> = Vec::new();
        for key in files.keys() {
            let Ok(rest) = key.strip_prefix(dir) else {
                continue;
            };
            let mut components = rest.components();
            let Some(first) = components.next() else {
                continue;
            };
            let entry = DirEntry {
                path: dir.join(first),
                is_dir: components.next().is_some(),
            };
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }
        sort_entries(&mut entries);
        Ok(entries)
    }

    fn delete(&self, path: &Path) -> bool {
        let mut files = self.files();
        let before = files.len();
        files.retain(|key, _| !key.starts_with(path));
        files.len() != before
    }

    fn rename(&self, from: &Path, to: &Path) -> bool {
        let mut files = self.files();
        let moved: Vec<PathBuf> = files
            .keys()
            .filter(|key| key.starts_with(from))
            .cloned()
            .collect();
        if moved.is_empty() {
            return false;
        }
        for key in moved {
            if let (Some(bytes), Ok(rest)) = (files.remove(&key), key.strip_prefix(from)) {
                let target = if rest.as_os_str().is_empty() {
                    to.to_path_buf()
                } else {
                    to.join(rest)
                };
                files.insert(target, bytes);
            }
        }
        true
    }
}
