//! Ordered work queue.
//!
//! [`WorkQueue`] is the FIFO the sequencer keeps its jobs in. It is generic and
//! usable on its own; its "added"/"empty" channels are [`Notifier`](crate::notify::Notifier)s.

mod work_queue;

pub use work_queue::WorkQueue;
