//! # Example: retry_in_place
//!
//! Compares the declarative [`RetryPolicy`] with a hand-written error policy,
//! and shows `skip` rescuing a queue whose head will never succeed.
//!
//! Shows how to:
//! - Give up after N consecutive failures with [`RetryPolicy::UpTo`].
//! - Rewrite the error a caller sees from a custom policy.
//! - Cancel a stuck head job with `skip(1)` while it is being retried.
//!
//! ## Run
//! ```bash
//! cargo run --features logging --example retry_in_place
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use jobline::{RetryPolicy, Sequencer, SequencerConfig, Subscribe};

fn subscribers() -> Vec<Arc<dyn Subscribe>> {
    #[cfg(feature = "logging")]
    {
        vec![Arc::new(jobline::LogWriter::new())]
    }
    #[cfg(not(feature = "logging"))]
    {
        Vec::new()
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 1) Declarative: three attempts, then the work error reaches the caller.
    let cfg = SequencerConfig {
        retry: RetryPolicy::UpTo(3),
        ..SequencerConfig::default()
    };
    let seq: Sequencer<u32, String> = Sequencer::builder(cfg)
        .with_subscribers(subscribers())
        .build();

    let attempts = Arc::new(AtomicU32::new(0));
    let a = Arc::clone(&attempts);
    let unreliable = seq.submit_named("unreliable", move || {
        let n = a.fetch_add(1, Ordering::SeqCst) + 1;
        async move { Err::<u32, _>(format!("attempt {n} timed out")) }
    });
    seq.run();
    println!("unreliable -> {:?}", unreliable.await);

    // 2) Custom: retry twice, then give up with a summarised error.
    seq.use_error_policy(|err, failures| {
        if failures < 3 {
            Ok(())
        } else {
            Err(format!("gave up after {failures} attempts, last error: {err}"))
        }
    });
    let summarised = seq.submit_named("summarised", || async {
        Err::<u32, _>("quota exceeded".to_string())
    });
    seq.run();
    println!("summarised -> {:?}", summarised.await);

    // 3) Retry forever, and skip the stuck head from outside.
    seq.use_retry_policy(RetryPolicy::Always);
    let stuck = seq.submit_named("stuck", || async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Err::<u32, _>("still broken".to_string())
    });
    let behind = seq.submit_named("behind", || async { Ok(42) });
    seq.run();

    tokio::time::sleep(Duration::from_millis(30)).await;
    println!("stuck head failed {} times so far", seq.head_failures());
    seq.skip(1);

    println!("stuck  -> {:?}", stuck.await);
    println!("behind -> {:?}", behind.await);

    seq.cleanup();
    tokio::time::sleep(Duration::from_millis(20)).await;
    Ok(())
}
