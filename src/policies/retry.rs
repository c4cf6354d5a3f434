//! # Ready-made error policies.
//!
//! [`RetryPolicy`] covers the common shapes of an [`ErrorPolicy`]:
//!
//! - [`RetryPolicy::Never`] give up on the first failure, rejecting with the original error (default).
//! - [`RetryPolicy::UpTo`] retry the head job in place, give up on the n-th consecutive failure.
//! - [`RetryPolicy::Always`] retry in place forever; the job only leaves via success or `skip`.
//!
//! ## Choosing the right policy
//! ```text
//! RetryPolicy::Never      → failed job rejects immediately, next job runs
//! RetryPolicy::UpTo(3)    → attempts 1 and 2 retried, 3rd failure rejects
//! RetryPolicy::Always     → head job blocks the queue until it succeeds
//! ```
//!
//! Anything richer (reconnecting, pausing, mapping the error) is a custom
//! closure passed to [`Sequencer::use_error_policy`](crate::Sequencer::use_error_policy).

use std::sync::Arc;

use super::ErrorPolicy;

/// Policy deciding whether a failed head job is retried in place or abandoned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Give up on the first failure (default).
    #[default]
    Never,
    /// Retry while the consecutive failure count is below `n`; give up when it reaches `n`.
    ///
    /// `UpTo(0)` and `UpTo(1)` both behave like [`RetryPolicy::Never`].
    UpTo(u32),
    /// Never give up.
    Always,
}

impl RetryPolicy {
    /// Applies the policy to one failure.
    ///
    /// `failures` is the consecutive failure count of the head job, starting at 1.
    /// Returns `Ok(())` to keep the job at the head, `Err(error)` to give up with
    /// the original error.
    ///
    /// # Example
    /// ```
    /// use jobline::RetryPolicy;
    ///
    /// let policy = RetryPolicy::UpTo(3);
    /// assert_eq!(policy.decide("down", 2), Ok(()));
    /// assert_eq!(policy.decide("down", 3), Err("down"));
    /// ```
    pub fn decide<E>(&self, error: E, failures: u32) -> Result<(), E> {
        match *self {
            RetryPolicy::Never => Err(error),
            RetryPolicy::UpTo(limit) if failures >= limit => Err(error),
            RetryPolicy::UpTo(_) => Ok(()),
            RetryPolicy::Always => Ok(()),
        }
    }

    /// Converts the policy into a boxed [`ErrorPolicy`].
    pub fn into_error_policy<E: 'static>(self) -> ErrorPolicy<E> {
        Arc::new(move |error: E, failures: u32| self.decide(error, failures))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_reraises_original_error() {
        assert_eq!(RetryPolicy::Never.decide("boom", 1), Err("boom"));
        assert_eq!(RetryPolicy::default(), RetryPolicy::Never);
    }

    #[test]
    fn up_to_gives_up_on_limit() {
        let policy = RetryPolicy::UpTo(3);
        assert_eq!(policy.decide(1, 1), Ok(()));
        assert_eq!(policy.decide(2, 2), Ok(()));
        assert_eq!(policy.decide(3, 3), Err(3));
        assert_eq!(policy.decide(4, 4), Err(4));
    }

    #[test]
    fn small_limits_behave_like_never() {
        assert_eq!(RetryPolicy::UpTo(0).decide('x', 1), Err('x'));
        assert_eq!(RetryPolicy::UpTo(1).decide('x', 1), Err('x'));
    }

    #[test]
    fn always_swallows() {
        assert_eq!(RetryPolicy::Always.decide("e", u32::MAX), Ok(()));
    }

    #[test]
    fn boxed_policy_matches_enum() {
        let policy = RetryPolicy::UpTo(2).into_error_policy::<String>();
        assert_eq!(policy("a".into(), 1), Ok(()));
        assert_eq!(policy("b".into(), 2), Err("b".to_string()));
    }
}
