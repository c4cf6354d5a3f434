//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for tests or demos. Enabled with the `logging` feature.
//!
//! ## Example output
//! ```text
//! [queued] job=job#1 name="connect" size=1
//! [starting] job=job#1 name="connect" attempt=1
//! [failed] job=job#1 name="connect" attempt=1 err="connection refused"
//! [retained] job=job#1 name="connect" attempt=1
//! [completed] job=job#1 name="connect" attempt=2
//! [canceled] job=job#2 name="fetch"
//! [paused]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn job_of(e: &Event) -> String {
    e.job.map(|j| j.to_string()).unwrap_or_else(|| "-".into())
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::JobQueued => {
                println!(
                    "[queued] job={} name={:?} size={:?}",
                    job_of(e),
                    e.name,
                    e.size
                );
            }
            EventKind::JobStarting => {
                println!(
                    "[starting] job={} name={:?} attempt={:?}",
                    job_of(e),
                    e.name,
                    e.attempt
                );
            }
            EventKind::JobCompleted => {
                println!(
                    "[completed] job={} name={:?} attempt={:?}",
                    job_of(e),
                    e.name,
                    e.attempt
                );
            }
            EventKind::JobFailed => {
                println!(
                    "[failed] job={} name={:?} attempt={:?} err={:?}",
                    job_of(e),
                    e.name,
                    e.attempt,
                    e.reason
                );
            }
            EventKind::JobRetained => {
                println!(
                    "[retained] job={} name={:?} attempt={:?}",
                    job_of(e),
                    e.name,
                    e.attempt
                );
            }
            EventKind::JobAbandoned => {
                println!(
                    "[abandoned] job={} name={:?} attempt={:?} err={:?}",
                    job_of(e),
                    e.name,
                    e.attempt,
                    e.reason
                );
            }
            EventKind::JobCanceled => {
                println!("[canceled] job={} name={:?}", job_of(e), e.name);
            }
            EventKind::OutcomeDiscarded => {
                println!(
                    "[discarded] job={} name={:?} attempt={:?}",
                    job_of(e),
                    e.name,
                    e.attempt
                );
            }
            EventKind::Paused => println!("[paused]"),
            EventKind::Resumed => println!("[resumed]"),
            EventKind::Closed => println!("[closed] canceled={:?}", e.size),
            EventKind::SubscriberOverflow => {
                println!(
                    "[subscriber-overflow] subscriber={:?} reason={:?}",
                    e.name, e.reason
                );
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={} info={}",
                    e.name.as_deref().unwrap_or("unknown"),
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
