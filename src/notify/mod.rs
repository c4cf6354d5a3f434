//! Listener notification primitive.
//!
//! ## Contents
//! - [`Notifier`] fan-out of one argument to a set of listeners (panics isolated)
//! - [`Subscription`] deregistration handle returned by [`Notifier::subscribe`]
//! - [`ListenerId`], [`Listener`] identity and callback types
//!
//! The work queue builds its "added" and "empty" channels on top of this type.

mod notifier;

pub use notifier::{Listener, ListenerId, Notifier, Subscription};
