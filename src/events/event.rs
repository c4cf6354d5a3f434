//! # Runtime events emitted by the sequencer.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Job lifecycle**: queued, starting, completed, failed, retained, abandoned, canceled
//! - **Control**: paused, resumed, closed
//! - **Subscriber health**: overflow and panics inside subscriber workers
//!
//! The [`Event`] struct carries additional metadata such as timestamps, job id,
//! attempt number, queue size and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use jobline::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::JobFailed)
//!     .with_name("sync-profile")
//!     .with_reason("connection reset")
//!     .with_attempt(2);
//!
//! assert_eq!(ev.kind, EventKind::JobFailed);
//! assert_eq!(ev.name.as_deref(), Some("sync-profile"));
//! assert_eq!(ev.reason.as_deref(), Some("connection reset"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::jobs::JobId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `name`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `name`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Job lifecycle events ===
    /// Job appended to the queue.
    ///
    /// Sets:
    /// - `job`, `name`
    /// - `size`: queue size after the push
    JobQueued,

    /// Head job is starting an attempt.
    ///
    /// Sets:
    /// - `job`, `name`
    /// - `attempt`: attempt number (1-based, per job)
    JobStarting,

    /// Head job completed; its handle resolved.
    ///
    /// Sets:
    /// - `job`, `name`, `attempt`
    JobCompleted,

    /// Head job's attempt returned an error; the error policy is consulted next.
    ///
    /// Sets:
    /// - `job`, `name`
    /// - `attempt`: consecutive failure count passed to the policy
    /// - `reason`: work error message
    JobFailed,

    /// Error policy accepted the failure; the job stays at the head for a retry.
    ///
    /// Sets:
    /// - `job`, `name`, `attempt`
    JobRetained,

    /// Job given up on (policy error or panic); its handle rejected.
    ///
    /// Sets:
    /// - `job`, `name`, `attempt`
    /// - `reason`: error the handle rejected with
    JobAbandoned,

    /// Job removed by `skip`/`clear`/`cleanup`; its handle rejected as canceled.
    ///
    /// Sets:
    /// - `job`, `name`
    JobCanceled,

    /// An in-flight attempt finished after its job had been removed; outcome dropped.
    ///
    /// Sets:
    /// - `job`, `name`, `attempt`
    OutcomeDiscarded,

    // === Control events ===
    /// Paused flag set.
    Paused,

    /// Paused flag cleared by `run()`.
    Resumed,

    /// `cleanup()` completed; the sequencer is torn down.
    ///
    /// Sets:
    /// - `size`: number of jobs canceled by the teardown
    Closed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Job the event refers to.
    pub job: Option<JobId>,
    /// Job name (or subscriber name for subscriber events).
    pub name: Option<Arc<str>>,
    /// Attempt / consecutive failure count (starting from 1).
    pub attempt: Option<u32>,
    /// Queue size.
    pub size: Option<usize>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            job: None,
            name: None,
            attempt: None,
            size: None,
            reason: None,
        }
    }

    /// Attaches a job id.
    #[inline]
    pub fn with_job(mut self, job: JobId) -> Self {
        self.job = Some(job);
        self
    }

    /// Attaches a job (or subscriber) name.
    #[inline]
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a queue size.
    #[inline]
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_name(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_name(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    /// True for events describing one job.
    #[inline]
    pub fn is_job_event(&self) -> bool {
        self.job.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::Paused);
        let b = Event::new(EventKind::Resumed);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn builders_fill_fields() {
        let ev = Event::new(EventKind::JobQueued)
            .with_job(JobId::new(3))
            .with_name("job")
            .with_size(4);

        assert!(ev.is_job_event());
        assert_eq!(ev.job, Some(JobId::new(3)));
        assert_eq!(ev.size, Some(4));
        assert_eq!(ev.attempt, None);
    }

    #[test]
    fn subscriber_overflow_carries_reason() {
        let ev = Event::subscriber_overflow("audit", "full");
        assert!(ev.is_subscriber_overflow());
        assert_eq!(ev.name.as_deref(), Some("audit"));
        assert_eq!(ev.reason.as_deref(), Some("subscriber=audit reason=full"));
    }
}
