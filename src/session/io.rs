//! Background writer for saves and navigation flushes.
//!
//! Jobs go out over a channel and outcomes come back over another. Nothing
//! here touches session state; the session drains outcomes on its own queue.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::store::FileStore;

/// Hash a byte slice for content comparison.
pub(crate) fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

#[derive(Debug)]
pub struct WriteJob {
    /// Which open document the job belongs to.
    pub generation: u64,
    /// Edit revision the bytes were taken at.
    pub revision: u64,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    pub hash: u64,
}

#[derive(Debug)]
pub struct WriteOutcome {
    pub generation: u64,
    pub revision: u64,
    pub path: PathBuf,
    pub hash: u64,
    pub result: io::Result<()>,
}

enum Request {
    Write(WriteJob),
    Shutdown,
}

/// Handle to the writer thread.
pub struct IoWorker {
    requests: Sender<Request>,
    outcomes: Receiver<WriteOutcome>,
    in_flight: usize,
    thread_handle: Option<JoinHandle<()>>,
}

impl IoWorker {
    pub fn spawn(store: Arc<dyn FileStore>) -> io::Result<Self> {
        let (requests, request_rx) = mpsc::channel::<Request>();
        let (outcome_tx, outcomes) = mpsc::channel();

        let thread_handle = thread::Builder::new()
            .name("chunkpad-io".to_string())
            .spawn(move || {
                while let Ok(Request::Write(job)) = request_rx.recv() {
                    let result = store.write(&job.path, &job.bytes);
                    let outcome = WriteOutcome {
                        generation: job.generation,
                        revision: job.revision,
                        path: job.path,
                        hash: job.hash,
                        result,
                    };
                    if outcome_tx.send(outcome).is_err() {
                        break;
                    }
                }
                tracing::debug!("io worker stopped");
            })?;

        Ok(Self {
            requests,
            outcomes,
            in_flight: 0,
            thread_handle: Some(thread_handle),
        })
    }

    /// Queue a write. Hands the job back if the worker is gone.
    pub fn submit(&mut self, job: WriteJob) -> Result<(), WriteJob> {
        match self.requests.send(Request::Write(job)) {
            Ok(()) => {
                self.in_flight += 1;
                Ok(())
            }
            Err(mpsc::SendError(Request::Write(job))) => Err(job),
            Err(mpsc::SendError(Request::Shutdown)) => Ok(()),
        }
    }

    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Outcomes that are ready now, without blocking.
    pub fn poll(&mut self) -> Vec<WriteOutcome> {
        let mut ready = Vec::new();
        while let Ok(outcome) = self.outcomes.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            ready.push(outcome);
        }
        ready
    }

    /// Block until every submitted job has reported back.
    pub fn wait_idle(&mut self) -> Vec<WriteOutcome> {
        let mut ready = Vec::new();
        while self.in_flight > 0 {
            match self.outcomes.recv() {
                Ok(outcome) => {
                    self.in_flight -= 1;
                    ready.push(outcome);
                }
                Err(_) => {
                    tracing::warn!(lost = self.in_flight, "io worker exited with writes pending");
                    self.in_flight = 0;
                }
            }
        }
        ready
    }

    pub fn shutdown(&mut self) {
        let _ = self.requests.send(Request::Shutdown);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for IoWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for IoWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoWorker")
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryFileStore;
    use std::path::Path;

    fn job(generation: u64, path: &str, text: &str) -> WriteJob {
        WriteJob {
            generation,
            revision: 1,
            path: PathBuf::from(path),
            bytes: text.as_bytes().to_vec(),
            hash: hash_bytes(text.as_bytes()),
        }
    }

    #[test]
    fn test_hash_bytes_distinguishes_content() {
        assert_eq!(hash_bytes(b"abc"), hash_bytes(b"abc"));
        assert_ne!(hash_bytes(b"abc"), hash_bytes(b"abd"));
    }

    #[test]
    fn test_writes_complete_after_wait_idle() {
        let store = Arc::new(MemoryFileStore::new());
        let mut worker = IoWorker::spawn(store.clone()).unwrap();
        worker.submit(job(1, "a.txt", "one")).unwrap();
        worker.submit(job(1, "b.txt", "two")).unwrap();
        assert_eq!(worker.in_flight(), 2);

        let outcomes = worker.wait_idle();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.result.is_ok()));
        assert_eq!(worker.in_flight(), 0);
        assert_eq!(store.contents("b.txt").as_deref(), Some("two"));
    }

    #[test]
    fn test_failures_are_reported_not_raised() {
        struct ReadOnly;
        impl FileStore for ReadOnly {
            fn read(&self, _: &Path) -> io::Result<Vec<u8>> {
                Ok(Vec::new())
            }
            fn write(&self, _: &Path, _: &[u8]) -> io::Result<()> {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
            }
            fn exists(&self, _: &Path) -> bool {
                true
            }
            fn list(&self, _: &Path) -> io::Result<Vec<crate::store::DirEntry>> {
                Ok(Vec::new())
            }
            fn delete(&self, _: &Path) -> bool {
                false
            }
            fn rename(&self, _: &Path, _: &Path) -> bool {
                false
            }
        }

        let mut worker = IoWorker::spawn(Arc::new(ReadOnly)).unwrap();
        worker.submit(job(7, "x.txt", "data")).unwrap();
        let outcomes = worker.wait_idle();
        assert_eq!(outcomes[0].generation, 7);
        assert_eq!(
            outcomes[0].result.as_ref().unwrap_err().kind(),
            io::ErrorKind::PermissionDenied
        );
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut worker = IoWorker::spawn(Arc::new(MemoryFileStore::new())).unwrap();
        worker.shutdown();
        worker.shutdown();
        assert!(worker.submit(job(1, "late.txt", "x")).is_err());
    }
}
