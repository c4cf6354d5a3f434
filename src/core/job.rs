//! Queued job: the work plus its one-shot settlement slot.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::error::JobError;
use crate::jobs::{BoxWorkFuture, JobHandle, JobId, JobOutcome, WorkRef};

/// A submitted unit of work waiting in (or at the head of) the queue.
///
/// The settlement sender is taken on first use, so a job resolves or rejects
/// at most once no matter how many paths race to settle it.
pub(crate) struct Job<T, E> {
    id: JobId,
    work: WorkRef<T, E>,
    settle: Mutex<Option<oneshot::Sender<JobOutcome<T, E>>>>,
}

impl<T: 'static, E: 'static> Job<T, E> {
    pub(crate) fn new(id: JobId, work: WorkRef<T, E>) -> (Arc<Self>, JobHandle<T, E>) {
        let (tx, rx) = oneshot::channel();
        let job = Arc::new(Self {
            id,
            work,
            settle: Mutex::new(Some(tx)),
        });
        (job, JobHandle::new(id, rx))
    }

    pub(crate) fn id(&self) -> JobId {
        self.id
    }

    pub(crate) fn name(&self) -> &str {
        self.work.name()
    }

    /// Starts one attempt of the work.
    pub(crate) fn spawn(&self) -> BoxWorkFuture<T, E> {
        self.work.spawn()
    }

    pub(crate) fn resolve(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    pub(crate) fn reject(&self, error: JobError<E>) -> bool {
        self.settle(Err(error))
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.settle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn settle(&self, outcome: JobOutcome<T, E>) -> bool {
        let tx = self
            .settle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match tx {
            Some(tx) => {
                // The caller may have dropped the handle; the job still counts as settled.
                let _ = tx.send(outcome);
                true
            }
            None => false,
        }
    }
}

impl<T: 'static, E: 'static> fmt::Debug for Job<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("settled", &self.is_settled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::WorkFn;

    fn job(id: u64) -> (Arc<Job<u32, String>>, JobHandle<u32, String>) {
        Job::new(JobId::new(id), WorkFn::arc("answer", || async { Ok::<u32, String>(42) }))
    }

    #[tokio::test]
    async fn settles_exactly_once() {
        let (job, handle) = job(1);
        assert!(job.resolve(7));
        assert!(!job.reject(JobError::Canceled));
        assert!(job.is_settled());
        assert_eq!(handle.await, Ok(7));
    }

    #[tokio::test]
    async fn spawn_runs_the_work() {
        let (job, _handle) = job(2);
        assert_eq!(job.name(), "answer");
        assert_eq!(job.spawn().await, Ok(42));
        assert!(!job.is_settled());
    }

    #[tokio::test]
    async fn dropped_job_cancels_handle() {
        let (job, handle) = job(3);
        drop(job);
        assert_eq!(handle.await, Err(JobError::Canceled));
    }
}
