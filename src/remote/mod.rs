//! Bulk import/export against a remote repository.
//!
//! The remote is a whole-file boundary. It never sees windows or chunks; the
//! session must be saved before pushing so the store holds merged content.

use std::io;
use std::path::{Path, PathBuf};

use crate::store::FileStore;

/// Commit message used when the caller leaves it blank.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Update project";

/// A GitHub-shaped remote: one commit per file operation.
pub trait RemoteRepository: Send + Sync {
    fn get_file(&self, path: &str) -> io::Result<Option<String>>;
    fn put_file(&self, path: &str, content: &str, message: &str) -> io::Result<()>;
    fn delete_file(&self, path: &str, message: &str) -> io::Result<()>;
    fn list_tree(&self) -> io::Result<Vec<String>>;
}

/// Outcome of a bulk sync. Individual failures do not stop the run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub transferred: Vec<String>,
    pub failed: Vec<(String, String)>,
}

impl SyncReport {
    pub const fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Push every file under `root` to `remote`, keyed by its path relative to
/// `root` with `/` separators.
pub fn push_all(
    store: &dyn FileStore,
    remote: &dyn RemoteRepository,
    root: &Path,
    message: &str,
) -> io::Result<SyncReport> {
    let message = if message.trim().is_empty() {
        DEFAULT_COMMIT_MESSAGE
    } else {
        message
    };
    let mut files = Vec::new();
    collect_files(store, root, &mut files)?;

    let mut report = SyncReport::default();
    for path in files {
        let key = remote_key(root, &path);
        let result = store
            .read(&path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .and_then(|content| remote.put_file(&key, &content, message));
        match result {
            Ok(()) => report.transferred.push(key),
            Err(err) => {
                tracing::warn!(path = %key, %err, "push failed");
                report.failed.push((key, err.to_string()));
            }
        }
    }
    Ok(report)
}

/// Fetch every file in the remote tree into `root`.
pub fn pull_all(
    store: &dyn FileStore,
    remote: &dyn RemoteRepository,
    root: &Path,
) -> io::Result<SyncReport> {
    let mut report = SyncReport::default();
    for key in remote.list_tree()? {
        let result = remote.get_file(&key).and_then(|content| match content {
            Some(content) => store.write(&root.join(&key), content.as_bytes()),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "missing on remote")),
        });
        match result {
            Ok(()) => report.transferred.push(key),
            Err(err) => {
                tracing::warn!(path = %key, %err, "pull failed");
                report.failed.push((key, err.to_string()));
            }
        }
    }
    Ok(report)
}

fn collect_files(store: &dyn FileStore, dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in store.list(dir)? {
        if entry.is_dir {
            collect_files(store, &entry.path, out)?;
        } else {
            out.push(entry.path);
        }
    }
    Ok(())
}

fn remote_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryFileStore;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeRemote {
        files: Mutex<BTreeMap<String, (String, String)>>,
        reject: Option<&'static str>,
    }

    impl RemoteRepository for FakeRemote {
        fn get_file(&self, path: &str) -> io::Result<Option<String>> {
            Ok(self.files.lock().unwrap().get(path).map(|(c, _)| c.clone()))
        }

        fn put_file(&self, path: &str, content: &str, message: &str) -> io::Result<()> {
            if self.reject == Some(path) {
                return Err(io::Error::other("422 rejected"));
            }
            self.files
                .lock()
                .unwrap()
                .insert(path.to_string(), (content.to_string(), message.to_string()));
            Ok(())
        }

        fn delete_file(&self, path: &str, _message: &str) -> io::Result<()> {
            self.files.lock().unwrap().remove(path);
            Ok(())
        }

        fn list_tree(&self) -> io::Result<Vec<String>> {
            Ok(self.files.lock().unwrap().keys().cloned().collect())
        }
    }

    #[test]
    fn test_push_all_walks_tree_with_default_message() {
        let store = MemoryFileStore::new()
            .with_file("proj/README.md", "# hi")
            .with_file("proj/src/main.go", "package main");
        let remote = FakeRemote::default();

        let report = push_all(&store, &remote, Path::new("proj"), "  ").unwrap();
        assert!(report.is_clean());
        assert_eq!(report.transferred, vec!["src/main.go", "README.md"]);
        let files = remote.files.lock().unwrap();
        assert_eq!(files["src/main.go"], ("package main".to_string(), DEFAULT_COMMIT_MESSAGE.to_string()));
    }

    #[test]
    fn test_push_all_records_failures_and_continues() {
        let store = MemoryFileStore::new()
            .with_file("p/a.txt", "a")
            .with_file("p/b.txt", "b");
        let remote = FakeRemote {
            reject: Some("a.txt"),
            ..FakeRemote::default()
        };
        let report = push_all(&store, &remote, Path::new("p"), "sync").unwrap();
        assert_eq!(report.transferred, vec!["b.txt"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "a.txt");
    }

    #[test]
    fn test_pull_all_writes_remote_files_locally() {
        let remote = FakeRemote::default();
        remote.put_file("lib/x.rs", "fn x() {}", "m").unwrap();
        let store = MemoryFileStore::new();

        let report = pull_all(&store, &remote, Path::new("checkout")).unwrap();
        assert!(report.is_clean());
        assert_eq!(store.contents("checkout/lib/x.rs").as_deref(), Some("fn x() {}"));
    }

    #[test]
    fn test_delete_file_removes_from_tree() {
        let remote = FakeRemote::default();
        remote.put_file("gone.txt", "x", "m").unwrap();
        remote.delete_file("gone.txt", "remove").unwrap();
        assert!(remote.list_tree().unwrap().is_empty());
    }
}
