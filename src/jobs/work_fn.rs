//! # Function-backed work (`WorkFn`)
//!
//! [`WorkFn`] wraps a closure `F: Fn() -> Fut`, producing a fresh future per
//! attempt. Retries re-call the closure; there is no hidden state carried between
//! attempts. If attempts need to share state, capture an `Arc<...>` explicitly.
//!
//! ## Example
//! ```rust
//! use jobline::{Work, WorkFn, WorkRef};
//!
//! let w: WorkRef<u32, String> = WorkFn::arc("answer", || async { Ok::<u32, String>(42) });
//! assert_eq!(w.name(), "answer");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::jobs::work::{BoxWorkFuture, Work};

/// Function-backed work implementation.
pub struct WorkFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> WorkFn<F> {
    /// Creates a new function-backed work.
    ///
    /// Prefer [`WorkFn::arc`] when you immediately need a [`WorkRef`](crate::WorkRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the work and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F, Fut, T, E> Work<T, E> for WorkFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn spawn(&self) -> BoxWorkFuture<T, E> {
        Box::pin((self.f)())
    }
}

impl<F> fmt::Debug for WorkFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkFn").field("name", &self.name).finish()
    }
}
