//! # Subscriber pipeline: bus listener plus per-subscriber lanes.
//!
//! [`SubscriberSet`] owns everything between the [`Bus`] and the [`Subscribe`]
//! implementations: one bounded lane and worker per subscriber, and the listener
//! task that relays bus events into those lanes until the sequencer closes.
//!
//! ## Architecture
//! ```text
//! Bus ──► listen() task ──► emit(event)
//!   ▲         │                 ├──► [lane 1] ──► worker 1 ──► subscriber1.on_event()
//!   │         │                 │    (bounded)        └──────► panic → SubscriberPanicked
//!   │         │                 └──► [lane N] ──► worker N ──► subscriberN.on_event()
//!   │         │
//!   │         └─ stops after relaying `Closed`, or once the runtime token is
//!   │            cancelled and nothing is left buffered; then lanes are drained
//!   └──────── SubscriberOverflow / SubscriberPanicked reports
//! ```
//!
//! ## Rules
//! - Each subscriber sees events in bus order; there is no ordering across subscribers.
//! - `emit()` never blocks. A full lane drops the event for that subscriber only.
//! - Overflow is reported once per burst: the lane reports again only after a
//!   successful delivery.
//! - Overflow reports are never themselves reported as overflowing.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::broadcast::error::RecvError;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::error::panic_message;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// Name used in overflow reports raised by the listener itself.
const LISTENER: &str = "subscriber-listener";

/// Delivery lane of one subscriber.
struct Lane {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
    overflowing: bool,
}

impl Lane {
    /// Queues `event`; returns the overflow reason if this starts a new burst of drops.
    fn offer(&mut self, event: &Arc<Event>) -> Option<&'static str> {
        let reason = match self.sender.try_send(Arc::clone(event)) {
            Ok(()) => {
                self.overflowing = false;
                return None;
            }
            Err(mpsc::error::TrySendError::Full(_)) => "full",
            Err(mpsc::error::TrySendError::Closed(_)) => "closed",
        };
        if self.overflowing {
            return None;
        }
        self.overflowing = true;
        Some(reason)
    }
}

/// Fans sequencer events out to subscribers without blocking the sequencer.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// Must be called from within a tokio runtime unless `subs` is empty.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut lanes = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let (sender, rx) = mpsc::channel(sub.queue_capacity().max(1));
            lanes.push(Lane {
                name: sub.name(),
                sender,
                overflowing: false,
            });
            workers.push(tokio::spawn(deliver(sub, rx, bus.clone())));
        }
        Self {
            lanes,
            workers,
            bus,
        }
    }

    /// Offers `event` to every lane.
    pub fn emit(&mut self, event: &Event) {
        let event = Arc::new(event.clone());
        let report = !event.is_subscriber_overflow();

        for lane in &mut self.lanes {
            match lane.offer(&event) {
                Some(reason) if report => {
                    self.bus.publish(Event::subscriber_overflow(lane.name, reason));
                }
                _ => {}
            }
        }
    }

    /// Spawns the listener that relays bus events to the subscribers.
    ///
    /// The bus receiver is created before this returns, so nothing published
    /// afterwards is missed. The listener stops after relaying
    /// [`EventKind::Closed`], or when `token` is cancelled and no events remain
    /// buffered; it then waits for every lane to drain.
    pub fn listen(mut self, token: CancellationToken) -> JoinHandle<()> {
        let mut rx = self.bus.subscribe();

        tokio::spawn(async move {
            loop {
                let msg = tokio::select! {
                    biased;
                    msg = rx.recv() => msg,
                    _ = token.cancelled() => break,
                };
                match msg {
                    Ok(ev) => {
                        self.emit(&ev);
                        if ev.kind == EventKind::Closed {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(_)) => {
                        self.emit(&Event::subscriber_overflow(LISTENER, "lagged"));
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            self.shutdown().await;
        })
    }

    /// Closes every lane and waits for the workers to deliver what is queued.
    pub async fn shutdown(self) {
        drop(self.lanes);
        for worker in self.workers {
            let _ = worker.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.len()
    }
}

/// Worker loop of one lane; a panicking subscriber is reported and keeps receiving.
async fn deliver(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        let handled = std::panic::AssertUnwindSafe(sub.on_event(ev.as_ref()))
            .catch_unwind()
            .await;
        if let Err(payload) = handled {
            bus.publish(Event::subscriber_panicked(
                sub.name(),
                panic_message(payload.as_ref()),
            ));
        }
    }
}
