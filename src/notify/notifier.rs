//! # Notifier: multi-listener fan-out with failure isolation.
//!
//! [`Notifier`] keeps a set of listeners and calls every one of them with the
//! same argument on [`trigger`](Notifier::trigger).
//!
//! ## Rules
//! - **Isolation**: a panicking listener is caught and discarded. The panic never
//!   reaches the caller of `trigger` and never stops the remaining listeners.
//! - **No lock during delivery**: listeners are snapshotted, then called with no
//!   internal lock held, so a listener may register/unregister (even itself) or
//!   trigger again.
//! - **Identity**: every [`register`](Notifier::register) call is a distinct
//!   listener. Registering the same `Arc` twice through
//!   [`register_shared`](Notifier::register_shared) is a no-op returning the
//!   original [`ListenerId`].
//! - **Order**: listeners are a set; delivery order is not part of the contract.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use jobline::notify::Notifier;
//!
//! let seen = Arc::new(AtomicUsize::new(0));
//! let notifier = Notifier::<usize>::new();
//!
//! let s = Arc::clone(&seen);
//! let id = notifier.register(move |n: &usize| { s.fetch_add(*n, Ordering::SeqCst); });
//! notifier.register(|_: &usize| panic!("isolated"));
//!
//! notifier.trigger(&3);
//! assert_eq!(seen.load(Ordering::SeqCst), 3);
//!
//! assert!(notifier.unregister(id));
//! assert!(!notifier.unregister(id));
//! ```

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Shared listener callback.
pub type Listener<A> = Arc<dyn Fn(&A) + Send + Sync + 'static>;

/// Global sequence for listener ids.
static LISTENER_SEQ: AtomicU64 = AtomicU64::new(1);

/// Identity of one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        Self(LISTENER_SEQ.fetch_add(1, Ordering::Relaxed))
    }
}

struct Entry<A> {
    id: ListenerId,
    listener: Listener<A>,
}

/// Fan-out broadcaster of `&A` to zero or more listeners.
pub struct Notifier<A> {
    entries: Mutex<Vec<Entry<A>>>,
}

impl<A> Notifier<A> {
    /// Creates a notifier with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Registers a new listener and returns its id.
    pub fn register<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        let mut entries = self.lock();
        let id = ListenerId::next();
        entries.push(Entry {
            id,
            listener: Arc::new(f),
        });
        id
    }

    /// Registers a shared listener.
    ///
    /// If the very same `Arc` is already registered, nothing is added and the
    /// existing id is returned.
    pub fn register_shared(&self, listener: Listener<A>) -> ListenerId {
        let mut entries = self.lock();
        if let Some(existing) = entries
            .iter()
            .find(|e| Arc::ptr_eq(&e.listener, &listener))
        {
            return existing.id;
        }
        let id = ListenerId::next();
        entries.push(Entry { id, listener });
        id
    }

    /// Removes a listener. Returns `false` if it was not registered.
    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        entries.len() != before
    }

    /// Removes every listener.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Calls every currently registered listener with `args`.
    ///
    /// Panics raised by listeners are swallowed.
    pub fn trigger(&self, args: &A) {
        let snapshot: Vec<Listener<A>> = self
            .lock()
            .iter()
            .map(|e| Arc::clone(&e.listener))
            .collect();

        for listener in snapshot {
            let _ = panic::catch_unwind(AssertUnwindSafe(|| listener(args)));
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Entry<A>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A: 'static> Notifier<A> {
    /// Registers a listener and returns a handle that can deregister it later.
    ///
    /// Dropping the [`Subscription`] does **not** deregister the listener;
    /// call [`Subscription::cancel`].
    pub fn subscribe<F>(self: &Arc<Self>, f: F) -> Subscription
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        let id = self.register(f);
        let weak = Arc::downgrade(self);
        Subscription {
            id,
            detach: Box::new(move || weak.upgrade().is_some_and(|n| n.unregister(id))),
        }
    }
}

impl<A> Default for Notifier<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for Notifier<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Deregistration handle returned by [`Notifier::subscribe`].
pub struct Subscription {
    id: ListenerId,
    detach: Box<dyn FnOnce() -> bool + Send>,
}

impl Subscription {
    /// Id of the underlying registration.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Deregisters the listener.
    ///
    /// Returns `false` if it was already removed (e.g. by `clear`) or the
    /// notifier no longer exists.
    pub fn cancel(self) -> bool {
        (self.detach)()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn trigger_delivers_same_args_to_every_listener() {
        let notifier = Notifier::<(bool, i32)>::new();
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));

        let f = Arc::clone(&first);
        notifier.register(move |args: &(bool, i32)| f.lock().unwrap().push(*args));
        notifier.trigger(&(true, 9999));
        assert_eq!(*first.lock().unwrap(), vec![(true, 9999)]);

        let s = Arc::clone(&second);
        notifier.register(move |args: &(bool, i32)| s.lock().unwrap().push(*args));
        notifier.trigger(&(false, -1234));

        assert_eq!(*first.lock().unwrap(), vec![(true, 9999), (false, -1234)]);
        assert_eq!(*second.lock().unwrap(), vec![(false, -1234)]);
    }

    #[test]
    fn panicking_listener_does_not_stop_others() {
        let notifier = Notifier::<()>::new();
        let hits = Arc::new(AtomicUsize::new(0));

        notifier.register(|_: &()| panic!("listener failure"));
        let h = Arc::clone(&hits);
        notifier.register(move |_: &()| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        notifier.register(|_: &()| panic!("another one"));

        notifier.trigger(&());
        notifier.trigger(&());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unregister_and_clear() {
        let notifier = Notifier::<u8>::new();
        let a = notifier.register(|_: &u8| {});
        let b = notifier.register(|_: &u8| {});
        assert_eq!(notifier.len(), 2);

        assert!(notifier.unregister(a));
        assert!(!notifier.unregister(a));
        assert_eq!(notifier.len(), 1);

        notifier.clear();
        assert!(notifier.is_empty());
        assert!(!notifier.unregister(b));
    }

    #[test]
    fn shared_listener_registered_once() {
        let notifier = Notifier::<u8>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let listener: Listener<u8> = Arc::new(move |_: &u8| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        let first = notifier.register_shared(Arc::clone(&listener));
        let second = notifier.register_shared(Arc::clone(&listener));
        assert_eq!(first, second);

        notifier.trigger(&0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn distinct_registrations_of_equal_closures_both_fire() {
        let notifier = Notifier::<u8>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let h = Arc::clone(&hits);
            notifier.register(move |_: &u8| {
                h.fetch_add(1, Ordering::SeqCst);
            });
        }
        notifier.trigger(&0);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn listener_may_unregister_itself_during_trigger() {
        let notifier = Arc::new(Notifier::<()>::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let slot: Arc<Mutex<Option<ListenerId>>> = Arc::new(Mutex::new(None));

        let n = Arc::downgrade(&notifier);
        let h = Arc::clone(&hits);
        let s = Arc::clone(&slot);
        let id = notifier.register(move |_: &()| {
            h.fetch_add(1, Ordering::SeqCst);
            if let (Some(n), Some(id)) = (n.upgrade(), *s.lock().unwrap()) {
                n.unregister(id);
            }
        });
        *slot.lock().unwrap() = Some(id);

        notifier.trigger(&());
        notifier.trigger(&());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(notifier.is_empty());
    }

    #[test]
    fn subscription_cancel_detaches() {
        let notifier = Arc::new(Notifier::<usize>::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let sub = notifier.subscribe(move |n: &usize| {
            h.fetch_add(*n, Ordering::SeqCst);
        });

        notifier.trigger(&2);
        assert!(sub.cancel());
        notifier.trigger(&5);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn subscription_cancel_after_clear_is_noop() {
        let notifier = Arc::new(Notifier::<()>::new());
        let sub = notifier.subscribe(|_: &()| {});
        notifier.clear();
        assert!(!sub.cancel());
    }
}
