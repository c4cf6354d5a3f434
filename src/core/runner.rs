//! # Run a single attempt of the head job.
//!
//! Executes one attempt of a [`Job`] and publishes `JobStarting` to the [`Bus`].
//! The outcome is classified but **not** applied: settling the job, consulting
//! the error policy and popping the queue are the drive loop's business, because
//! the job may have been skipped while the attempt was in flight.
//!
//! ## Flow
//! ```text
//! publish JobStarting{ job, attempt }
//!   └─► job.spawn().await (inside catch_unwind)
//!         ├─ Ok(value) ──► Attempt::Completed
//!         ├─ Err(e)    ──► Attempt::Failed
//!         └─ panic     ──► Attempt::Panicked
//! ```
//!
//! ## Rules
//! - Publishes **exactly one** event (`JobStarting`) before the work runs
//! - A panic while *creating* the future is caught the same way as one while polling it

use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::core::job::Job;
use crate::error::panic_message;
use crate::events::{Bus, Event, EventKind};

/// Classified outcome of one attempt.
pub(crate) enum Attempt<T, E> {
    Completed(T),
    Failed(E),
    Panicked(String),
}

/// Executes a single attempt of `job`, publishing `JobStarting` to `bus`.
///
/// `attempt` is 1-based: one more than the consecutive failures recorded for this job.
pub(crate) async fn run_once<T, E>(job: &Job<T, E>, attempt: u32, bus: &Bus) -> Attempt<T, E>
where
    T: 'static,
    E: 'static,
{
    bus.publish(
        Event::new(EventKind::JobStarting)
            .with_job(job.id())
            .with_name(job.name())
            .with_attempt(attempt),
    );

    let res = AssertUnwindSafe(async { job.spawn().await })
        .catch_unwind()
        .await;

    match res {
        Ok(Ok(value)) => Attempt::Completed(value),
        Ok(Err(err)) => Attempt::Failed(err),
        Err(payload) => Attempt::Panicked(panic_message(payload.as_ref())),
    }
}
