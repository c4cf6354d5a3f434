//! # Caller-side handle of a submitted job.
//!
//! [`JobHandle`] is the future returned by [`Sequencer::submit`](crate::Sequencer::submit).
//! It is the only channel through which the caller observes the job's outcome:
//! - `Ok(value)` when the work completed;
//! - `Err(JobError::Failed(e))` when the error policy gave up;
//! - `Err(JobError::Canceled)` when the job was skipped/cleared, or the
//!   sequencer was dropped while the job was still queued;
//! - `Err(JobError::Panicked(_))` when the work panicked.
//!
//! Dropping the handle does not cancel the job; it still runs in its turn.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::JobError;

/// Sequencer-local job identifier, assigned in submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl JobId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw numeric value (1-based).
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job#{}", self.0)
    }
}

/// Outcome delivered to a [`JobHandle`].
pub(crate) type JobOutcome<T, E> = Result<T, JobError<E>>;

/// Awaitable result of one submitted job.
pub struct JobHandle<T, E> {
    id: JobId,
    rx: oneshot::Receiver<JobOutcome<T, E>>,
}

impl<T, E> JobHandle<T, E> {
    pub(crate) fn new(id: JobId, rx: oneshot::Receiver<JobOutcome<T, E>>) -> Self {
        Self { id, rx }
    }

    /// Id of the job this handle belongs to.
    pub fn id(&self) -> JobId {
        self.id
    }
}

impl<T, E> Future for JobHandle<T, E> {
    type Output = JobOutcome<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.unwrap_or_else(|_closed| Err(JobError::Canceled)))
    }
}

impl<T, E> fmt::Debug for JobHandle<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobHandle").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_with_sent_outcome() {
        let (tx, rx) = oneshot::channel();
        let handle: JobHandle<u8, String> = JobHandle::new(JobId::new(1), rx);
        assert_eq!(handle.id().get(), 1);

        tx.send(Ok(5)).ok();
        assert_eq!(handle.await, Ok(5));
    }

    #[tokio::test]
    async fn dropped_sender_reads_as_canceled() {
        let (tx, rx) = oneshot::channel::<JobOutcome<u8, String>>();
        let handle = JobHandle::new(JobId::new(2), rx);
        drop(tx);
        assert_eq!(handle.await, Err(JobError::Canceled));
    }

    #[test]
    fn id_display() {
        assert_eq!(JobId::new(7).to_string(), "job#7");
    }
}
