/// Fires once after a quiet period measured from the most recent `queue`.
///
/// Time is passed in rather than read, so callers drive it from whatever
/// clock the session was built with.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    delay_ms: u64,
    pending: Option<u64>,
}

impl Debouncer {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    /// Restart the quiet period at `now_ms`.
    pub const fn queue(&mut self, now_ms: u64) {
        self.pending = Some(now_ms);
    }

    /// True exactly once when the quiet period has elapsed.
    pub fn take_ready(&mut self, now_ms: u64) -> bool {
        let Some(queued_at) = self.pending else {
            return false;
        };
        if now_ms.saturating_sub(queued_at) >= self.delay_ms {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub const fn cancel(&mut self) {
        self.pending = None;
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Milliseconds until the pending timer fires, if one is pending.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.pending
            .map(|queued_at| (queued_at + self.delay_ms).saturating_sub(now_ms))
    }
}
