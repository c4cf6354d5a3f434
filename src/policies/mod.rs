//! Error-handling policies.
//!
//! An [`ErrorPolicy`] is consulted every time the head job fails. It receives the
//! work error and the head job's consecutive failure count (1-based) and decides:
//!
//! - `Ok(())` → accept the failure; the job stays at the head and is re-run by
//!   the next drive cycle;
//! - `Err(e)` → give up; the job's handle rejects with `JobError::Failed(e)` and
//!   the job is removed.
//!
//! The policy runs with no sequencer lock held, so it may call `pause`, `run`,
//! `skip`, ... on the sequencer (e.g. pause, reconnect, then resume).
//!
//! ## Contents
//! - [`ErrorPolicy`] the boxed decision function
//! - [`RetryPolicy`] ready-made policies (never / up-to-n / always)
//!
//! ## Default
//! [`RetryPolicy::Never`]: give up immediately, re-raising the original error unchanged.

mod retry;

use std::sync::Arc;

pub use retry::RetryPolicy;

/// Replaceable decision function for failed head jobs.
pub type ErrorPolicy<E> = Arc<dyn Fn(E, u32) -> Result<(), E> + Send + Sync + 'static>;
