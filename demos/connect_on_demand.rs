//! # Example: connect_on_demand
//!
//! A request pipeline that opens its connection lazily and reconnects when a
//! request fails, without losing or reordering requests.
//!
//! Shows how to:
//! - Start processing from an [`on_added`](jobline::Sequencer::on_added) listener
//!   the first time work arrives.
//! - Pause from the error policy, reconnect in the background, then `run()` again
//!   so the failed request is retried in place.
//! - Tear everything down with `cleanup()`.
//!
//! ## Flow
//! ```text
//! submit(req #1) ──► on_added(size = 1) ──► spawn(connect) ──► run()
//!                                                             │
//! drive: req #1 ok, req #2 ok, req #3 ──► Err(disconnected)   │
//!          └─► policy: pause(), spawn(connect), Ok(()) ───────┘ (retry req #3)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example connect_on_demand
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use jobline::{JobHandle, Sequencer, SequencerConfig};

/// Pretend network connection that can drop at any time.
#[derive(Default)]
struct Connection {
    up: AtomicBool,
    requests: AtomicUsize,
}

impl Connection {
    async fn open(&self) {
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.up.store(true, Ordering::SeqCst);
        println!("[conn] connected");
    }

    async fn request(&self, path: &'static str) -> Result<String, String> {
        if !self.up.load(Ordering::SeqCst) {
            return Err(format!("{path}: disconnected"));
        }
        // Every third request drops the connection.
        if self.requests.fetch_add(1, Ordering::SeqCst) % 3 == 2 {
            self.up.store(false, Ordering::SeqCst);
            return Err(format!("{path}: connection reset"));
        }
        Ok(format!("200 OK {path}"))
    }
}

fn reconnect(seq: &Sequencer<String, String>, conn: &Arc<Connection>) {
    let (seq, conn) = (seq.clone(), Arc::clone(conn));
    tokio::spawn(async move {
        conn.open().await;
        seq.run();
    });
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let conn = Arc::new(Connection::default());
    let seq: Sequencer<String, String> = Sequencer::new(SequencerConfig::default());

    {
        let (s, c) = (seq.clone(), Arc::clone(&conn));
        let connecting = Arc::new(AtomicBool::new(false));
        seq.on_added(move |size| {
            if size == 1 && !c.up.load(Ordering::SeqCst) && !connecting.swap(true, Ordering::SeqCst) {
                reconnect(&s, &c);
            }
        });
    }
    {
        let (s, c) = (seq.clone(), Arc::clone(&conn));
        seq.use_error_policy(move |err, failures| {
            println!("[policy] {err} (failure #{failures}), reconnecting");
            if failures > 5 {
                return Err(err);
            }
            s.pause();
            reconnect(&s, &c);
            Ok(())
        });
    }
    seq.on_empty(|| println!("[queue] drained"));

    let handles: Vec<JobHandle<String, String>> = ["/users", "/orders", "/invoices", "/stock"]
        .into_iter()
        .map(|path| {
            let conn = Arc::clone(&conn);
            seq.submit_named(path, move || {
                let conn = Arc::clone(&conn);
                async move { conn.request(path).await }
            })
        })
        .collect();

    for handle in handles {
        match handle.await {
            Ok(body) => println!("[resp] {body}"),
            Err(err) => println!("[resp] error: {err}"),
        }
    }

    seq.cleanup();
    Ok(())
}
