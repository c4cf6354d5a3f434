//! # Example: custom_subscriber
//!
//! Demonstrates how to build and attach a custom event subscriber.
//!
//! Shows how to:
//! - Implement the [`Subscribe`] trait.
//! - Inspect [`Event`] / [`EventKind`] for job lifecycle metrics.
//! - Wire the subscriber in with [`Sequencer::builder`].
//!
//! ## Flow
//! ```text
//! submit(job) ──► Bus.publish(JobQueued)
//! run()       ──► Bus.publish(Resumed)
//!     └─► drive task
//!           ├─► publish(JobStarting / JobCompleted / JobFailed / JobRetained / ...)
//!           └─► SubscriberSet listener ──► Tally lane ──► Tally.on_event()
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example custom_subscriber
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use jobline::{Event, EventKind, RetryPolicy, Sequencer, SequencerConfig, Subscribe};

/// Counts outcomes and prints failures as they happen.
/// In real life, you could export metrics, ship logs, or trigger alerts.
#[derive(Default)]
struct Tally {
    completed: AtomicUsize,
    retained: AtomicUsize,
    abandoned: AtomicUsize,
}

#[async_trait::async_trait]
impl Subscribe for Tally {
    async fn on_event(&self, ev: &Event) {
        match ev.kind {
            EventKind::JobCompleted => {
                self.completed.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::JobFailed => {
                println!(
                    "[tally] failed: job={} attempt={} reason={}",
                    ev.name.as_deref().unwrap_or("<unknown>"),
                    ev.attempt.unwrap_or(0),
                    ev.reason.as_deref().unwrap_or("<none>")
                );
            }
            EventKind::JobRetained => {
                self.retained.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::JobAbandoned => {
                self.abandoned.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::Closed => println!("[tally] closed"),
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "tally"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let tally = Arc::new(Tally::default());
    let cfg = SequencerConfig {
        retry: RetryPolicy::UpTo(3),
        ..SequencerConfig::default()
    };

    let seq: Sequencer<u32, String> = Sequencer::builder(cfg)
        .with_subscribers(vec![tally.clone()])
        .build();

    let flaky_calls = Arc::new(AtomicU32::new(0));
    let calls = Arc::clone(&flaky_calls);
    let flaky = seq.submit_named("flaky", move || {
        let attempt = calls.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            if attempt < 2 {
                Err(format!("transient error on attempt {attempt}"))
            } else {
                Ok(attempt)
            }
        }
    });
    let broken = seq.submit_named("broken", || async { Err("permanent".to_string()) });
    let steady = seq.submit_named("steady", || async { Ok(7) });

    seq.run();
    println!("flaky  -> {:?}", flaky.await);
    println!("broken -> {:?}", broken.await);
    println!("steady -> {:?}", steady.await);

    seq.cleanup();
    tokio::time::sleep(Duration::from_millis(50)).await;

    println!(
        "completed={} retained={} abandoned={}",
        tally.completed.load(Ordering::Relaxed),
        tally.retained.load(Ordering::Relaxed),
        tally.abandoned.load(Ordering::Relaxed),
    );
    Ok(())
}
