//! Error types surfaced to job submitters.
//!
//! A [`JobHandle`](crate::JobHandle) resolves to `Result<T, JobError<E>>`, where `E`
//! is the error type produced by the submitted work. The work error itself never
//! reaches the caller directly: it is first routed through the sequencer's
//! [`ErrorPolicy`](crate::ErrorPolicy), and only the error the policy gives up with
//! ends up inside [`JobError::Failed`].
//!
//! Like the rest of the runtime's errors, [`JobError`] provides helper methods
//! (`as_label`, `as_message`) for logs and events.

use std::any::Any;

use thiserror::Error;

/// # Ways a submitted job can end without producing a value.
///
/// - [`JobError::Canceled`]: removed by `skip`/`clear`/`cleanup` before it completed.
/// - [`JobError::Failed`]: the error policy gave up on the job.
/// - [`JobError::Panicked`]: the work future or the error policy panicked.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError<E> {
    /// Job was removed from the queue before completing.
    ///
    /// Also reported when the sequencer is dropped while the job is still queued.
    #[error("job canceled")]
    Canceled,

    /// The error policy rejected the job with this error.
    ///
    /// With the default policy this is the error returned by the work itself.
    #[error("job failed: {0}")]
    Failed(E),

    /// The work future (or the error policy handling its failure) panicked.
    #[error("job panicked: {0}")]
    Panicked(String),
}

impl<E> JobError<E> {
    /// Returns a short stable label (snake_case) for use in logs/events.
    ///
    /// # Example
    /// ```
    /// use jobline::JobError;
    ///
    /// let err: JobError<String> = JobError::Canceled;
    /// assert_eq!(err.as_label(), "job_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            JobError::Canceled => "job_canceled",
            JobError::Failed(_) => "job_failed",
            JobError::Panicked(_) => "job_panicked",
        }
    }

    /// True if the job was canceled rather than failed.
    pub fn is_canceled(&self) -> bool {
        matches!(self, JobError::Canceled)
    }

    /// Returns the policy error, if the job was abandoned after failure.
    ///
    /// # Example
    /// ```
    /// use jobline::JobError;
    ///
    /// let err = JobError::Failed("offline");
    /// assert_eq!(err.into_failure(), Some("offline"));
    /// assert_eq!(JobError::<&str>::Canceled.into_failure(), None);
    /// ```
    pub fn into_failure(self) -> Option<E> {
        match self {
            JobError::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl<E: std::fmt::Display> JobError<E> {
    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            JobError::Canceled => "canceled before completion".to_string(),
            JobError::Failed(e) => format!("error: {e}"),
            JobError::Panicked(info) => format!("panic: {info}"),
        }
    }
}

/// Extracts a readable message from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(JobError::<u8>::Canceled.as_label(), "job_canceled");
        assert_eq!(JobError::Failed(1u8).as_label(), "job_failed");
        assert_eq!(JobError::<u8>::Panicked("x".into()).as_label(), "job_panicked");
    }

    #[test]
    fn display_includes_cause() {
        let err = JobError::Failed("connection refused");
        assert_eq!(err.to_string(), "job failed: connection refused");
        assert_eq!(err.as_message(), "error: connection refused");
        assert!(!err.is_canceled());
        assert!(JobError::<&str>::Canceled.is_canceled());
    }

    #[test]
    fn panic_payloads_are_readable() {
        let owned = std::panic::catch_unwind(|| panic!("{}", String::from("owned"))).unwrap_err();
        let fixed = std::panic::catch_unwind(|| panic!("static")).unwrap_err();
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(fixed.as_ref()), "static");
    }
}
