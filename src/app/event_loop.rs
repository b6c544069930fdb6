use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use super::update::{Message, Outcome, update};
use crate::error::Result;
use crate::session::Session;

/// Upper bound on how long the loop sleeps with no timer pending, so
/// finished background writes are picked up promptly.
const IDLE_TICK: Duration = Duration::from_millis(250);

pub(super) enum Request {
    Message(Message, Sender<Result<Outcome>>),
    Shutdown(Sender<Result<()>>),
}

fn wait_for(session: &Session) -> Duration {
    session
        .next_deadline_ms()
        .map_or(IDLE_TICK, |ms| Duration::from_millis(ms.max(1)).min(IDLE_TICK))
}

/// Process requests one at a time until shut down.
pub(super) fn run(mut session: Session, requests: &Receiver<Request>) {
    tracing::debug!("editor queue started");
    loop {
        match requests.recv_timeout(wait_for(&session)) {
            Ok(Request::Message(msg, reply)) => {
                let result = update(&mut session, msg);
                let _ = reply.send(result);
                session.tick();
            }
            Ok(Request::Shutdown(reply)) => {
                let result = if session.is_open() {
                    session.close()
                } else {
                    Ok(())
                };
                let _ = reply.send(result);
                break;
            }
            Err(RecvTimeoutError::Timeout) => session.tick(),
            Err(RecvTimeoutError::Disconnected) => {
                if session.is_open()
                    && let Err(err) = session.close()
                {
                    tracing::warn!(%err, "final flush failed");
                }
                break;
            }
        }
    }
    tracing::debug!("editor queue stopped");
}
