//! Save scheduling
//!
//! The store can be written on every keystroke; the disk should not be. The
//! first write after a flush arms the queue, later writes coalesce into it,
//! and the save becomes due `debounce_ms` after arming. The caller owns the
//! clock and the timer, so this type only answers "is it time yet".

/// Debounced persistence with explicit flush
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistQueue {
    debounce_ms: u64,
    armed_at: Option<u64>,
}

impl PersistQueue {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            armed_at: None,
        }
    }

    pub fn debounce_ms(&self) -> u64 {
        self.debounce_ms
    }

    /// Record a write at `now_ms`; returns true if this armed the queue
    pub fn note_write(&mut self, now_ms: u64) -> bool {
        if self.armed_at.is_some() {
            return false;
        }
        self.armed_at = Some(now_ms);
        true
    }

    pub fn is_pending(&self) -> bool {
        self.armed_at.is_some()
    }

    /// When the pending save becomes due
    pub fn due_at(&self) -> Option<u64> {
        self.armed_at
            .map(|armed| armed.saturating_add(self.debounce_ms))
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        self.due_at().is_some_and(|due| now_ms >= due)
    }

    /// Disarm if due; returns true when the caller should save now
    pub fn take_due(&mut self, now_ms: u64) -> bool {
        if self.is_due(now_ms) {
            self.armed_at = None;
            return true;
        }
        false
    }

    /// Drop a pending save without running it
    pub fn cancel(&mut self) {
        self.armed_at = None;
    }

    /// Teardown: disarm and report whether a save was pending
    ///
    /// Returns true exactly once per armed period, so the caller runs the
    /// final save once.
    pub fn flush(&mut self) -> bool {
        self.armed_at.take().is_some()
    }
}

impl Default for PersistQueue {
    fn default() -> Self {
        Self::new(300)
    }
}
