//! # Work abstraction.
//!
//! A [`Work`] is what a job executes. It is invoked once per attempt: a failed
//! job that the error policy keeps in place is re-executed by calling
//! [`spawn`](Work::spawn) again, so every attempt gets a **fresh** future.
//!
//! The common handle type is [`WorkRef`], an `Arc<dyn Work<T, E>>`.
//!
//! # Example
//! ```
//! use jobline::{BoxWorkFuture, Work};
//!
//! struct Ping;
//!
//! impl Work<&'static str, String> for Ping {
//!     fn name(&self) -> &str { "ping" }
//!
//!     fn spawn(&self) -> BoxWorkFuture<&'static str, String> {
//!         Box::pin(async { Ok("pong") })
//!     }
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future produced by one attempt of a [`Work`].
pub type BoxWorkFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'static>>;

/// Shared handle to a work object.
pub type WorkRef<T, E> = Arc<dyn Work<T, E>>;

/// Re-invokable asynchronous unit producing `Result<T, E>`.
pub trait Work<T, E>: Send + Sync + 'static {
    /// Human-readable name, used in events.
    fn name(&self) -> &str;

    /// Creates the future for one attempt.
    fn spawn(&self) -> BoxWorkFuture<T, E>;
}
