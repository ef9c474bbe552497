//! Virtual event-loop clock.
//!
//! Deferred work (the scroll-permission window, the user-scroll idle
//! debounce, counter ticks, message expiry) is queued here as plain
//! [`TimerTask`] values instead of closures. The owner of the components
//! pops due tasks and routes them, so every component stays a plain
//! `&mut self` value and time only moves when [`crate::site::Site::advance`]
//! says so.
//!
//! Tasks with the same deadline fire in the order they were scheduled,
//! matching `setTimeout` ordering.

use crate::forms::FormKind;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    /// End of a scroll-permission window opened with the given generation.
    RevokeScrollPermission { generation: u64 },
    /// The user stopped scrolling (debounced).
    UserScrollIdle { generation: u64 },
    /// Second look at the URL fragment shortly after load.
    PostLoadHashCheck,
    /// One step of a running stat counter.
    CounterTick { counter: usize },
    /// Hide a form's status message.
    ClearFormMessage { form: FormKind, generation: u64 },
}

#[derive(Debug, Default)]
pub struct Timers {
    now: u64,
    seq: u64,
    queue: BTreeMap<(u64, u64), TimerTask>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds.
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule(&mut self, delay_ms: u64, task: TimerTask) {
        self.seq += 1;
        self.queue.insert((self.now + delay_ms, self.seq), task);
    }

    /// Remove and return the earliest task due at or before `until`,
    /// moving the clock to its deadline.
    pub fn pop_due(&mut self, until: u64) -> Option<TimerTask> {
        let (&(at, _), _) = self.queue.first_key_value()?;
        if at > until {
            return None;
        }
        let ((at, _), task) = self.queue.pop_first()?;
        self.now = self.now.max(at);
        Some(task)
    }

    /// Move the clock forward without firing anything.
    pub fn set_now(&mut self, now: u64) {
        self.now = self.now.max(now);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_scheduled(&self, pred: impl Fn(&TimerTask) -> bool) -> bool {
        self.queue.values().any(pred)
    }
}
