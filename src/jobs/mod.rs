//! # Job abstractions.
//!
//! This module provides the job-related types:
//! - [`Work`] - trait for re-invokable async work (one future per attempt)
//! - [`WorkFn`] - closure-backed work implementation
//! - [`WorkRef`] - shared reference to work (`Arc<dyn Work<T, E>>`)
//! - [`JobHandle`] / [`JobId`] - the caller's view of a submitted job

mod handle;
mod work;
mod work_fn;

pub(crate) use handle::JobOutcome;
pub use handle::{JobHandle, JobId};
pub use work::{BoxWorkFuture, Work, WorkRef};
pub use work_fn::WorkFn;
