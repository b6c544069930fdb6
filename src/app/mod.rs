//! The editor queue.
//!
//! A [`Session`] is not shared between threads. Instead it moves onto a
//! dedicated thread and every request reaches it as a [`Message`]:
//! - [`App::send`] posts a message and blocks for its [`Outcome`]
//! - [`update`] applies a message to the session
//! - between messages the loop ticks the session's timers

mod event_loop;
mod update;

pub use update::{Message, Outcome, View, update};

use std::io;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use self::event_loop::Request;
use crate::error::{EditorError, Result, StateError};
use crate::session::Session;

/// Handle to the editor queue thread.
pub struct App {
    requests: Sender<Request>,
    thread_handle: Option<JoinHandle<()>>,
}

impl App {
    /// Move `session` onto its own thread.
    pub fn spawn(session: Session) -> io::Result<Self> {
        let (requests, receiver) = mpsc::channel();
        let thread_handle = thread::Builder::new()
            .name("chunkpad-editor".to_string())
            .spawn(move || event_loop::run(session, &receiver))?;
        Ok(Self {
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    /// Send a message and wait for it to be processed.
    pub fn send(&self, message: Message) -> Result<Outcome> {
        let (reply, response) = mpsc::channel();
        self.requests
            .send(Request::Message(message, reply))
            .map_err(|_| EditorError::State(StateError::QueueClosed))?;
        response
            .recv()
            .map_err(|_| EditorError::State(StateError::QueueClosed))?
    }

    /// Close the open document and stop the thread.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.thread_handle.take() else {
            return Ok(());
        };
        let (reply, response) = mpsc::channel();
        let result = match self.requests.send(Request::Shutdown(reply)) {
            Ok(()) => response
                .recv()
                .unwrap_or(Err(EditorError::State(StateError::QueueClosed))),
            Err(_) => Err(EditorError::State(StateError::QueueClosed)),
        };
        let _ = handle.join();
        result
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            tracing::warn!(%err, "editor queue did not shut down cleanly");
        }
    }
}
