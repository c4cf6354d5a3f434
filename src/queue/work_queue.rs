//! # Ordered work queue with size-change notifications.
//!
//! [`WorkQueue`] is a FIFO of opaque items guarded by a mutex, plus two
//! [`Notifier`] channels:
//! - **added**: fired after every [`push`](WorkQueue::push) with the new size;
//! - **empty**: fired when a removal takes the queue from non-empty to empty.
//!
//! ## Rules
//! - Only the head is ever handed out for execution; removal is always a prefix.
//! - Notifications fire **after** the lock is released, so listeners may call back
//!   into the queue.
//! - "empty" fires exactly on the transition into emptiness, never for a removal
//!   from an already empty queue.
//! - [`cleanup`](WorkQueue::cleanup) drops listeners only; items stay queued.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use jobline::queue::WorkQueue;
//!
//! let sizes = Arc::new(Mutex::new(Vec::new()));
//! let queue = WorkQueue::new();
//!
//! let s = Arc::clone(&sizes);
//! queue.on_added(move |n: &usize| s.lock().unwrap().push(*n));
//!
//! queue.push("a");
//! queue.push("b");
//! assert_eq!(queue.head(), Some("a"));
//! assert_eq!(queue.pop(5), vec!["a", "b"]);
//! assert_eq!(*sizes.lock().unwrap(), vec![1, 2]);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::notify::{Notifier, Subscription};

/// FIFO queue with "added" and "empty" notifications.
pub struct WorkQueue<T> {
    items: Mutex<VecDeque<T>>,
    added: Arc<Notifier<usize>>,
    emptied: Arc<Notifier<()>>,
}

impl<T> WorkQueue<T> {
    /// Creates an empty queue with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            added: Arc::new(Notifier::new()),
            emptied: Arc::new(Notifier::new()),
        }
    }

    /// Appends `item` and fires "added" with the new size, which is also returned.
    pub fn push(&self, item: T) -> usize {
        self.push_with(item, |_, _| {})
    }

    /// Like [`push`](Self::push), but calls `inspect` with the item and the new
    /// size before "added" listeners run.
    ///
    /// `inspect` runs under the queue lock; it must not call back into this queue.
    pub fn push_with<F>(&self, item: T, inspect: F) -> usize
    where
        F: FnOnce(&T, usize),
    {
        let size = {
            let mut items = self.lock();
            items.push_back(item);
            let size = items.len();
            if let Some(pushed) = items.back() {
                inspect(pushed, size);
            }
            size
        };
        self.added.trigger(&size);
        size
    }

    /// Removes up to `n` items from the front and returns them in order.
    pub fn pop(&self, n: usize) -> Vec<T> {
        self.pop_each(n, |_| {})
    }

    /// Like [`pop`](Self::pop), but calls `visit` on each item, front to back,
    /// before it is removed.
    ///
    /// `visit` runs under the queue lock; it must not call back into this queue.
    pub fn pop_each<F>(&self, n: usize, mut visit: F) -> Vec<T>
    where
        F: FnMut(&T),
    {
        let (removed, emptied) = {
            let mut items = self.lock();
            let take = n.min(items.len());
            items.iter().take(take).for_each(&mut visit);
            let removed: Vec<T> = items.drain(..take).collect();
            let emptied = !removed.is_empty() && items.is_empty();
            (removed, emptied)
        };
        if emptied {
            self.emptied.trigger(&());
        }
        removed
    }

    /// Removes the head only if `pred` holds for it.
    ///
    /// The check and the removal happen under one lock acquisition.
    pub fn pop_head_if<P>(&self, pred: P) -> Option<T>
    where
        P: FnOnce(&T) -> bool,
    {
        let (removed, emptied) = {
            let mut items = self.lock();
            match items.front() {
                Some(head) if pred(head) => {
                    let removed = items.pop_front();
                    (removed, items.is_empty())
                }
                _ => (None, false),
            }
        };
        if emptied {
            self.emptied.trigger(&());
        }
        removed
    }

    /// Current number of items.
    pub fn size(&self) -> usize {
        self.lock().len()
    }

    /// True if the queue holds no items.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Registers a listener for "added"; it receives the new total size.
    pub fn on_added<F>(&self, f: F) -> Subscription
    where
        F: Fn(&usize) + Send + Sync + 'static,
    {
        self.added.subscribe(f)
    }

    /// Registers a listener for the transition into emptiness.
    pub fn on_empty<F>(&self, f: F) -> Subscription
    where
        F: Fn(&()) + Send + Sync + 'static,
    {
        self.emptied.subscribe(f)
    }

    /// Drops all "added" and "empty" listeners. Items are left untouched.
    pub fn cleanup(&self) {
        self.added.clear();
        self.emptied.clear();
    }

    /// Total number of listeners across both channels.
    pub fn listener_count(&self) -> usize {
        self.added.len() + self.emptied.len()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone> WorkQueue<T> {
    /// Returns a clone of the front item, or `None` on an empty queue.
    pub fn head(&self) -> Option<T> {
        self.lock().front().cloned()
    }

    /// Returns a clone of the back item, or `None` on an empty queue.
    pub fn tail(&self) -> Option<T> {
        self.lock().back().cloned()
    }
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for WorkQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkQueue")
            .field("size", &self.size())
            .field("added_listeners", &self.added.len())
            .field("empty_listeners", &self.emptied.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_empty(queue: &WorkQueue<u32>) -> Arc<AtomicUsize> {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        queue.on_empty(move |_: &()| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        hits
    }

    #[test]
    fn push_reports_new_size() {
        let queue = WorkQueue::new();
        let sizes = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&sizes);
        queue.on_added(move |n: &usize| s.lock().unwrap().push(*n));

        assert_eq!(queue.push(10u32), 1);
        assert_eq!(queue.push(20), 2);
        assert_eq!(queue.push(30), 3);
        assert_eq!(*sizes.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn push_with_sees_item_before_listeners() {
        let queue = WorkQueue::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let o = Arc::clone(&order);
        queue.on_added(move |n: &usize| o.lock().unwrap().push(format!("listener {n}")));

        let size = queue.push_with(5u32, |item, n| {
            order.lock().unwrap().push(format!("inspect {item} {n}"));
        });
        assert_eq!(size, 1);
        assert_eq!(*order.lock().unwrap(), vec!["inspect 5 1", "listener 1"]);
    }

    #[test]
    fn pop_more_than_available_takes_everything() {
        let queue = WorkQueue::new();
        queue.push(1u32);
        queue.push(2);

        assert_eq!(queue.pop(10), vec![1, 2]);
        assert!(queue.is_empty());
        assert!(queue.pop(1).is_empty());
    }

    #[test]
    fn empty_fires_only_on_transition() {
        let queue = WorkQueue::new();
        let hits = counting_empty(&queue);

        queue.pop(1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        queue.push(1);
        queue.push(2);
        queue.pop(1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        queue.pop(1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        queue.pop(3);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn pop_zero_keeps_items_and_stays_silent() {
        let queue = WorkQueue::new();
        let hits = counting_empty(&queue);
        queue.push(1);

        assert!(queue.pop(0).is_empty());
        assert_eq!(queue.size(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn head_and_tail() {
        let queue: WorkQueue<u32> = WorkQueue::new();
        assert_eq!(queue.head(), None);
        assert_eq!(queue.tail(), None);

        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert_eq!(queue.head(), Some(1));
        assert_eq!(queue.tail(), Some(3));
    }

    #[test]
    fn pop_each_visits_front_to_back() {
        let queue = WorkQueue::new();
        for i in 0..5u32 {
            queue.push(i);
        }
        let mut seen = Vec::new();
        let removed = queue.pop_each(3, |item| seen.push(*item));

        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(removed, vec![0, 1, 2]);
        assert_eq!(queue.head(), Some(3));
    }

    #[test]
    fn pop_head_if_checks_identity() {
        let queue = WorkQueue::new();
        let hits = counting_empty(&queue);
        queue.push(7u32);

        assert_eq!(queue.pop_head_if(|h| *h == 8), None);
        assert_eq!(queue.size(), 1);
        assert_eq!(queue.pop_head_if(|h| *h == 7), Some(7));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(queue.pop_head_if(|_| true), None);
    }

    #[test]
    fn listener_may_reenter_queue() {
        let queue = Arc::new(WorkQueue::new());
        let observed = Arc::new(AtomicUsize::new(0));

        let q = Arc::downgrade(&queue);
        let o = Arc::clone(&observed);
        queue.on_added(move |_: &usize| {
            if let Some(q) = q.upgrade() {
                o.store(q.size(), Ordering::SeqCst);
            }
        });

        queue.push(1u32);
        queue.push(2);
        assert_eq!(observed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cleanup_drops_listeners_but_keeps_items() {
        let queue = WorkQueue::new();
        let hits = counting_empty(&queue);
        let sub = queue.on_added(|_: &usize| {});
        queue.push(1u32);
        assert_eq!(queue.listener_count(), 2);

        queue.cleanup();
        assert_eq!(queue.listener_count(), 0);
        assert_eq!(queue.size(), 1);
        assert!(!sub.cancel());

        queue.pop(1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn subscription_cancel_stops_delivery() {
        let queue = WorkQueue::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let sub = queue.on_added(move |_: &usize| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        queue.push(1u32);
        assert!(sub.cancel());
        queue.push(2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
