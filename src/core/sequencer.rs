//! # Sequencer: single-concurrency job runner.
//!
//! The [`Sequencer`] accepts jobs, keeps them in FIFO order and executes them one
//! at a time. Control is driven by [`run`](Sequencer::run), [`pause`](Sequencer::pause),
//! [`skip`](Sequencer::skip) and [`clear`](Sequencer::clear); the caller observes
//! each job through the [`JobHandle`] returned by `submit`.
//!
//! ## Architecture
//! ```text
//! submit(work) ──► WorkQueue ──(added)──► on_added listeners
//!                     │
//! run() ──► state: Ready ──► Processing ──► tokio::spawn(drive)
//!                                               │
//! drive loop:                                   ▼
//!   ├─► head = queue.head()
//!   ├─► run_once(head, attempt) ──► JobStarting
//!   ├─► head still at front?
//!   │     └─ no  ──► OutcomeDiscarded (job was skipped)
//!   ├─► Completed ──► resolve handle, pop head, JobCompleted
//!   ├─► Failed    ──► JobFailed, consult error policy (no lock held)
//!   │                   ├─ Ok(())  ──► JobRetained, head stays for retry
//!   │                   └─ Err(e') ──► reject Failed(e'), pop head, JobAbandoned
//!   ├─► Panicked  ──► reject Panicked, pop head, JobAbandoned
//!   └─► continue while Processing and queue non-empty, else settle state
//! ```
//!
//! ## Rules
//! - At most **one** attempt is in flight at any time.
//! - A job leaves the queue only after it is settled, so it is always the head while running.
//! - Pausing never interrupts the in-flight attempt; the cycle stops after it.
//! - Lock order is `control → queue`; listeners and policies run with no lock held.
//! - Dropping the last handle to a sequencer rejects queued jobs with [`JobError::Canceled`].

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::core::builder::SequencerBuilder;
use crate::core::config::SequencerConfig;
use crate::core::job::Job;
use crate::core::runner::{Attempt, run_once};
use crate::core::state::SequencerState;
use crate::error::{JobError, panic_message};
use crate::events::{Bus, Event, EventKind};
use crate::jobs::{JobHandle, JobId, WorkFn, WorkRef};
use crate::notify::Subscription;
use crate::policies::{ErrorPolicy, RetryPolicy};
use crate::queue::WorkQueue;

/// Consecutive failures of one job while it sits at the head.
#[derive(Clone, Copy, Debug)]
struct FailureStreak {
    job: JobId,
    failures: u32,
}

/// Mutable control block, guarded by one mutex.
struct Control<E> {
    state: SequencerState,
    streak: Option<FailureStreak>,
    policy: ErrorPolicy<E>,
}

impl<E> Control<E> {
    fn failures_of(&self, job: JobId) -> u32 {
        self.streak
            .filter(|s| s.job == job)
            .map_or(0, |s| s.failures)
    }

    fn bump_streak(&mut self, job: JobId) -> u32 {
        let failures = self.failures_of(job).saturating_add(1);
        self.streak = Some(FailureStreak { job, failures });
        failures
    }
}

struct Inner<T, E> {
    queue: WorkQueue<Arc<Job<T, E>>>,
    control: Mutex<Control<E>>,
    bus: Bus,
    next_id: AtomicU64,
    drive_on_submit: bool,
    runtime_token: CancellationToken,
}

/// Runs submitted jobs strictly one at a time, in submission order.
///
/// `Sequencer` is a cheap handle; clones share the same queue and state.
/// Methods that may start a drive cycle (`run`, and `submit` with
/// `drive_on_submit`) must be called from within a tokio runtime.
///
/// # Example
/// ```rust
/// use jobline::{Sequencer, SequencerConfig};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let seq: Sequencer<u32, String> = Sequencer::new(SequencerConfig::default());
///
///     let first = seq.submit(|| async { Ok(1) });
///     let second = seq.submit(|| async { Ok(2) });
///     assert_eq!(seq.size(), 2);
///
///     seq.run();
///     assert_eq!(first.await, Ok(1));
///     assert_eq!(second.await, Ok(2));
/// }
/// ```
pub struct Sequencer<T, E> {
    inner: Arc<Inner<T, E>>,
}

impl<T, E> Clone for Sequencer<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> Sequencer<T, E>
where
    T: Send + 'static,
    E: fmt::Display + Send + 'static,
{
    /// Creates a sequencer with no subscribers and the config's retry policy.
    ///
    /// Does not need a runtime until jobs are started.
    pub fn new(cfg: SequencerConfig) -> Self {
        Self::builder(cfg).build()
    }

    /// Returns a builder for a sequencer with subscribers or a custom error policy.
    pub fn builder(cfg: SequencerConfig) -> SequencerBuilder<T, E> {
        SequencerBuilder::new(cfg)
    }

    pub(crate) fn from_parts(
        cfg: &SequencerConfig,
        bus: Bus,
        policy: ErrorPolicy<E>,
        runtime_token: CancellationToken,
    ) -> Self {
        let control = Control {
            state: cfg.initial_state(),
            streak: None,
            policy,
        };
        Self {
            inner: Arc::new(Inner {
                queue: WorkQueue::new(),
                control: Mutex::new(control),
                bus,
                next_id: AtomicU64::new(1),
                drive_on_submit: cfg.drive_on_submit,
                runtime_token,
            }),
        }
    }

    /// Submits a closure producing one attempt of the work.
    ///
    /// The closure is called again for every retry.
    ///
    /// # Panics
    /// With `drive_on_submit` enabled, panics if called outside a tokio runtime
    /// while the sequencer is ready and idle.
    pub fn submit<F, Fut>(&self, f: F) -> JobHandle<T, E>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.submit_work(WorkFn::arc("job", f))
    }

    /// Like [`submit`](Self::submit), with a name that shows up in events.
    ///
    /// # Panics
    /// Same as [`submit`](Self::submit).
    pub fn submit_named<F, Fut>(&self, name: impl Into<Cow<'static, str>>, f: F) -> JobHandle<T, E>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.submit_work(WorkFn::arc(name, f))
    }

    /// Appends a job to the tail of the queue and returns its handle.
    ///
    /// Never starts work by itself unless `drive_on_submit` is enabled and the
    /// sequencer is ready and idle.
    ///
    /// # Panics
    /// Starting that cycle calls `tokio::spawn`, which panics outside a tokio runtime.
    pub fn submit_work(&self, work: WorkRef<T, E>) -> JobHandle<T, E> {
        let inner = &self.inner;
        let id = JobId::new(inner.next_id.fetch_add(1, Ordering::Relaxed));
        let (job, handle) = Job::new(id, work);

        inner.queue.push_with(job, |job, size| {
            inner.bus.publish(
                Event::new(EventKind::JobQueued)
                    .with_job(job.id())
                    .with_name(job.name())
                    .with_size(size),
            );
        });

        if inner.drive_on_submit {
            inner.kick();
        }
        handle
    }

    /// Clears the paused flag and starts a drive cycle if one is not active.
    ///
    /// Calling `run()` while a cycle is active only clears the paused flag.
    ///
    /// # Panics
    /// Panics if called outside a tokio runtime when there is queued work to start.
    pub fn run(&self) {
        self.inner.run();
    }

    /// Sets the paused flag. An in-flight attempt is not interrupted; the
    /// cycle stops once it settles.
    pub fn pause(&self) {
        self.inner.pause();
    }

    /// Removes up to `n` jobs from the front, rejecting each with
    /// [`JobError::Canceled`]. Returns how many were removed.
    ///
    /// If the head is in flight, its eventual outcome is discarded.
    pub fn skip(&self, n: usize) -> usize {
        self.inner.skip(n)
    }

    /// Removes every queued job. Returns how many were removed.
    pub fn clear(&self) -> usize {
        self.inner.skip(self.inner.queue.size())
    }

    /// Tears the sequencer down: pause, cancel every queued job, drop all
    /// queue listeners and stop the subscriber workers.
    pub fn cleanup(&self) {
        let inner = &self.inner;
        inner.pause();
        let canceled = inner.skip(inner.queue.size());
        inner.queue.cleanup();
        inner
            .bus
            .publish(Event::new(EventKind::Closed).with_size(canceled));
        inner.runtime_token.cancel();
    }

    /// Replaces the error policy.
    ///
    /// The policy receives the work error and the head job's consecutive
    /// failure count (starting at 1). `Ok(())` keeps the job at the head for
    /// another attempt; `Err(e)` rejects it with [`JobError::Failed`].
    /// A failure already being handled keeps the policy it started with.
    pub fn use_error_policy<P>(&self, policy: P)
    where
        P: Fn(E, u32) -> Result<(), E> + Send + Sync + 'static,
    {
        self.inner.lock().policy = Arc::new(policy);
    }

    /// Replaces the error policy with a declarative [`RetryPolicy`].
    pub fn use_retry_policy(&self, retry: RetryPolicy) {
        self.inner.lock().policy = retry.into_error_policy();
    }

    /// Registers a listener for submissions; it receives the new queue size.
    pub fn on_added<F>(&self, f: F) -> Subscription
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.inner.queue.on_added(move |size: &usize| f(*size))
    }

    /// Registers a listener for the queue becoming empty.
    pub fn on_empty<F>(&self, f: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.queue.on_empty(move |_: &()| f())
    }

    /// Number of queued jobs, including the in-flight head.
    pub fn size(&self) -> usize {
        self.inner.queue.size()
    }

    /// True if no jobs are queued.
    pub fn is_empty(&self) -> bool {
        self.inner.queue.is_empty()
    }

    /// Current control state.
    pub fn state(&self) -> SequencerState {
        self.inner.lock().state
    }

    /// True if the paused flag is set.
    pub fn is_paused(&self) -> bool {
        self.state().is_paused()
    }

    /// True while a drive cycle is active.
    pub fn is_processing(&self) -> bool {
        self.state().is_processing()
    }

    /// Consecutive failures of the current head job (0 if none).
    pub fn head_failures(&self) -> u32 {
        let head = self.inner.queue.head();
        head.map_or(0, |job| self.inner.lock().failures_of(job.id()))
    }

    /// Subscribes to the raw event stream.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }
}

impl<T, E> Default for Sequencer<T, E>
where
    T: Send + 'static,
    E: fmt::Display + Send + 'static,
{
    fn default() -> Self {
        Self::new(SequencerConfig::default())
    }
}

impl<T, E> fmt::Debug for Sequencer<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequencer")
            .field("state", &self.inner.lock().state)
            .field("size", &self.inner.queue.size())
            .finish()
    }
}

impl<T, E> Inner<T, E> {
    fn lock(&self) -> MutexGuard<'_, Control<E>> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: 'static, E: 'static> Inner<T, E> {
    fn pause(&self) {
        let paused = {
            let mut ctl = self.lock();
            let was_paused = ctl.state.is_paused();
            ctl.state = ctl.state.paused();
            !was_paused
        };
        if paused {
            self.bus.publish(Event::new(EventKind::Paused));
        }
    }

    fn skip(&self, n: usize) -> usize {
        let removed = self.queue.pop_each(n, |job| {
            job.reject(JobError::Canceled);
        });
        if removed.is_empty() {
            return 0;
        }
        self.lock().streak = None;

        for job in &removed {
            self.bus.publish(
                Event::new(EventKind::JobCanceled)
                    .with_job(job.id())
                    .with_name(job.name()),
            );
        }
        removed.len()
    }

    fn is_head(&self, job: &Arc<Job<T, E>>) -> bool {
        self.queue
            .head()
            .is_some_and(|head| Arc::ptr_eq(&head, job))
    }

    fn pop_if_head(&self, job: &Arc<Job<T, E>>) {
        self.queue.pop_head_if(|head| Arc::ptr_eq(head, job));
    }
}

impl<T, E> Inner<T, E>
where
    T: Send + 'static,
    E: fmt::Display + Send + 'static,
{
    fn run(self: &Arc<Self>) {
        let resumed = {
            let mut ctl = self.lock();
            let was_paused = ctl.state.is_paused();
            ctl.state = ctl.state.resumed();
            was_paused
        };
        if resumed {
            self.bus.publish(Event::new(EventKind::Resumed));
        }
        self.kick();
    }

    /// Starts a drive cycle if the sequencer is ready and has work.
    fn kick(self: &Arc<Self>) {
        let start = {
            let mut ctl = self.lock();
            let start = ctl.state == SequencerState::Ready && !self.queue.is_empty();
            if start {
                ctl.state = SequencerState::Processing;
            }
            start
        };
        if start {
            let inner = Arc::clone(self);
            tokio::spawn(async move { inner.drive().await });
        }
    }

    async fn drive(self: Arc<Self>) {
        loop {
            self.step().await;

            let more = {
                let mut ctl = self.lock();
                if ctl.state == SequencerState::Processing && !self.queue.is_empty() {
                    true
                } else {
                    ctl.state = ctl.state.settled();
                    false
                }
            };
            if !more {
                break;
            }
            // Lets pause/skip callers run between attempts on a current-thread runtime.
            tokio::task::yield_now().await;
        }
    }

    /// Runs one attempt of the head job and applies its outcome.
    async fn step(&self) {
        let Some(job) = self.queue.head() else {
            return;
        };
        let attempt = self.lock().failures_of(job.id()).saturating_add(1);

        let outcome = run_once(&job, attempt, &self.bus).await;

        if !self.is_head(&job) {
            self.bus.publish(
                Event::new(EventKind::OutcomeDiscarded)
                    .with_job(job.id())
                    .with_name(job.name())
                    .with_attempt(attempt),
            );
            return;
        }

        match outcome {
            Attempt::Completed(value) => {
                // A concurrent skip may have rejected the job after the head check.
                if !job.resolve(value) {
                    return;
                }
                self.lock().streak = None;
                self.pop_if_head(&job);
                self.bus.publish(
                    Event::new(EventKind::JobCompleted)
                        .with_job(job.id())
                        .with_name(job.name())
                        .with_attempt(attempt),
                );
            }
            Attempt::Failed(err) => self.handle_failure(&job, err),
            Attempt::Panicked(info) => self.abandon(&job, JobError::Panicked(info), attempt),
        }
    }

    fn handle_failure(&self, job: &Arc<Job<T, E>>, err: E) {
        let (failures, policy) = {
            let mut ctl = self.lock();
            let failures = ctl.bump_streak(job.id());
            (failures, Arc::clone(&ctl.policy))
        };

        let mut failed = Event::new(EventKind::JobFailed)
            .with_job(job.id())
            .with_name(job.name())
            .with_attempt(failures);
        if self.bus.has_receivers() {
            failed = failed.with_reason(err.to_string());
        }
        self.bus.publish(failed);

        match panic::catch_unwind(AssertUnwindSafe(|| policy(err, failures))) {
            Ok(Ok(())) => {
                // The policy itself may have skipped the job.
                if !self.is_head(job) {
                    return;
                }
                self.bus.publish(
                    Event::new(EventKind::JobRetained)
                        .with_job(job.id())
                        .with_name(job.name())
                        .with_attempt(failures),
                );
            }
            Ok(Err(give_up)) => self.abandon(job, JobError::Failed(give_up), failures),
            Err(payload) => {
                let info = panic_message(payload.as_ref());
                self.abandon(job, JobError::Panicked(info), failures);
            }
        }
    }

    fn abandon(&self, job: &Arc<Job<T, E>>, err: JobError<E>, attempt: u32) {
        let reason = self.bus.has_receivers().then(|| err.as_message());
        if !job.reject(err) {
            return;
        }
        self.lock().streak = None;
        self.pop_if_head(job);

        let mut ev = Event::new(EventKind::JobAbandoned)
            .with_job(job.id())
            .with_name(job.name())
            .with_attempt(attempt);
        if let Some(reason) = reason {
            ev = ev.with_reason(reason);
        }
        self.bus.publish(ev);
    }
}

impl<T, E> Drop for Inner<T, E> {
    fn drop(&mut self) {
        self.runtime_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn seq() -> Sequencer<u32, String> {
        Sequencer::new(SequencerConfig::default())
    }

    #[tokio::test]
    async fn paused_sequencer_only_queues() {
        let seq = seq();
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);
        let _h = seq.submit(move || {
            c.fetch_add(1, Ordering::SeqCst);
            async { Ok(1) }
        });

        tokio::task::yield_now().await;
        assert_eq!(seq.state(), SequencerState::Paused);
        assert_eq!(seq.size(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn run_on_empty_queue_stays_ready() {
        let seq = seq();
        seq.run();
        assert_eq!(seq.state(), SequencerState::Ready);
        seq.pause();
        assert_eq!(seq.state(), SequencerState::Paused);
    }

    #[tokio::test]
    async fn pause_during_attempt_stops_after_it() {
        let seq = seq();
        let gate = Arc::new(Notify::new());
        let g = Arc::clone(&gate);
        let first = seq.submit(move || {
            let g = Arc::clone(&g);
            async move {
                g.notified().await;
                Ok(1)
            }
        });
        let second = seq.submit(|| async { Ok(2) });

        seq.run();
        tokio::task::yield_now().await;
        assert_eq!(seq.state(), SequencerState::Processing);

        seq.pause();
        assert_eq!(seq.state(), SequencerState::Pausing);
        gate.notify_one();

        assert_eq!(first.await, Ok(1));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(seq.state(), SequencerState::Paused);
        assert_eq!(seq.size(), 1);

        seq.run();
        assert_eq!(second.await, Ok(2));
    }

    #[tokio::test]
    async fn policy_sees_consecutive_failures() {
        let seq = seq();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        seq.use_error_policy(move |_, failures| {
            s.lock().unwrap().push(failures);
            Ok(())
        });

        let remaining = Arc::new(AtomicUsize::new(2));
        let r = Arc::clone(&remaining);
        let handle = seq.submit(move || {
            let r = Arc::clone(&r);
            async move {
                if r.load(Ordering::SeqCst) == 0 {
                    return Ok(9);
                }
                r.fetch_sub(1, Ordering::SeqCst);
                Err("later".to_string())
            }
        });
        assert_eq!(seq.head_failures(), 0);

        seq.run();
        assert_eq!(handle.await, Ok(9));
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
        assert_eq!(seq.head_failures(), 0);
    }

    #[test]
    fn queueing_needs_no_runtime() {
        let seq = seq();
        let _h = seq.submit(|| async { Ok(1) });
        seq.pause();
        assert_eq!(seq.size(), 1);
    }

    #[test]
    #[should_panic]
    fn run_with_queued_work_outside_a_runtime_panics() {
        let seq = seq();
        let _h = seq.submit(|| async { Ok(1) });
        seq.run();
    }

    #[tokio::test]
    async fn debug_shows_state_and_size() {
        let seq = seq();
        let _h = seq.submit(|| async { Ok(1) });
        let dbg = format!("{seq:?}");
        assert!(dbg.contains("Paused"));
        assert!(dbg.contains("size: 1"));
    }
}
