//! # jobline
//!
//! **Jobline** is a single-flight async job sequencer for Rust.
//!
//! Jobs are submitted as async closures, kept in FIFO order and executed
//! strictly one at a time. The sequencer can be paused and resumed, queued jobs
//! can be skipped or cleared, and a failing job can be kept at the head and
//! retried in place by an error policy (for example after reconnecting the
//! resource it depends on).
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     submit(job #1)     submit(job #2)     submit(job #3)
//!            │                  │                  │
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Sequencer (control handle, cheap to clone)                       │
//! │  - WorkQueue (FIFO, "added" / "empty" notifications)              │
//! │  - Control (state: Paused/Ready/Processing/Pausing,               │
//! │             failure streak, error policy)                         │
//! │  - Bus (broadcast events)                                         │
//! └──────┬──────────────────────────────────────────────────┬─────────┘
//!        │ run()                                            │
//!        ▼                                                  │
//!     ┌──────────────────────┐                              │
//!     │  drive task          │  Publishes:                  │
//!     │  (one job at a time) │  JobStarting, JobCompleted,  │
//!     └──────────────────────┘  JobFailed, JobRetained, ... │
//!        │                                                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │              (capacity: SequencerConfig::bus_capacity)            │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                                  ┌─────────┼─────────┐
//!                                  ▼         ▼         ▼
//!                               worker1   worker2   workerN
//! ```
//!
//! ### Lifecycle of the head job
//! ```text
//! loop while Processing and queue non-empty {
//!   ├─► attempt = consecutive failures + 1
//!   ├─► publish JobStarting{ job, attempt }
//!   ├─► run the work
//!   │       ├─ Ok(v)  ──► resolve handle, pop, JobCompleted
//!   │       ├─ Err(e) ──► JobFailed, error policy(e, failures)
//!   │       │               ├─ Ok(())  ─► JobRetained, retry in place
//!   │       │               └─ Err(e') ─► reject Failed(e'), pop, JobAbandoned
//!   │       └─ panic  ──► reject Panicked, pop, JobAbandoned
//!   └─► skipped meanwhile? outcome discarded (OutcomeDiscarded)
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                         |
//! |-------------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Sequencing**    | FIFO single-flight execution, pause/resume, skip/clear.       | [`Sequencer`], [`SequencerState`]          |
//! | **Jobs**          | Define work as closures or trait objects; await the outcome.  | [`WorkFn`], [`Work`], [`JobHandle`]        |
//! | **Policies**      | Decide per failure whether to retry in place or give up.      | [`ErrorPolicy`], [`RetryPolicy`]           |
//! | **Subscriber API**| Hook into job lifecycle events (logging, metrics, custom).    | [`Subscribe`], [`Event`]                   |
//! | **Errors**        | Typed outcome of a job that did not complete.                 | [`JobError`]                               |
//! | **Configuration** | Centralize sequencer settings.                                | [`SequencerConfig`]                        |
//! | **Building blocks**| Notification channel and ordered queue used by the sequencer.| [`notify::Notifier`], [`queue::WorkQueue`] |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use jobline::{JobError, RetryPolicy, Sequencer, SequencerConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let cfg = SequencerConfig {
//!         retry: RetryPolicy::UpTo(3),
//!         ..SequencerConfig::default()
//!     };
//!
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn jobline::Subscribe>> = vec![Arc::new(jobline::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn jobline::Subscribe>> = Vec::new();
//!
//!     let seq: Sequencer<&'static str, String> = Sequencer::builder(cfg)
//!         .with_subscribers(subs)
//!         .build();
//!
//!     let hello = seq.submit_named("hello", || async { Ok("hello") });
//!     let broken = seq.submit_named("broken", || async { Err("offline".to_string()) });
//!
//!     // Nothing runs until the sequencer is started.
//!     seq.run();
//!
//!     assert_eq!(hello.await, Ok("hello"));
//!     assert_eq!(broken.await, Err(JobError::Failed("offline".to_string())));
//!     seq.cleanup();
//! }
//! ```
mod core;
mod error;
mod events;
mod jobs;
mod policies;
mod subscribers;

pub mod notify;
pub mod queue;

// ---- Public re-exports ----

pub use crate::core::{Sequencer, SequencerBuilder, SequencerConfig, SequencerState};
pub use error::JobError;
pub use events::{Bus, Event, EventKind};
pub use jobs::{BoxWorkFuture, JobHandle, JobId, Work, WorkFn, WorkRef};
pub use policies::{ErrorPolicy, RetryPolicy};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
