use std::time::{Duration, Instant};

/// A reschedulable deadline: each `schedule` pushes the deadline out to
/// `now + quiet`, so a burst of triggers fires once after the burst ends.
///
/// Callers pass the current time in, which keeps the timer usable from a
/// polling event loop and deterministic in tests.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Debouncer {
            quiet,
            deadline: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Schedule (or reschedule) the deadline relative to `now`
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Consume the deadline if it has passed. Returns true when the caller
    /// should run the debounced effect now.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }

    /// Consume a pending deadline regardless of time (flush).
    pub fn take_pending(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Time left until the deadline, for sizing the event-loop poll timeout
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }
}
