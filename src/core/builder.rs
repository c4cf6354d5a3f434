use std::marker::PhantomData;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    core::{Sequencer, SequencerConfig},
    events::Bus,
    policies::ErrorPolicy,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Sequencer`] with optional features.
pub struct SequencerBuilder<T, E> {
    cfg: SequencerConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    policy: Option<ErrorPolicy<E>>,
    _output: PhantomData<fn() -> T>,
}

impl<T, E> SequencerBuilder<T, E>
where
    T: Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SequencerConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            policy: None,
            _output: PhantomData,
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive job lifecycle and control events through dedicated
    /// workers with bounded queues. Building with subscribers requires a tokio runtime.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the initial error policy, overriding `SequencerConfig::retry`.
    pub fn with_error_policy<P>(mut self, policy: P) -> Self
    where
        P: Fn(E, u32) -> Result<(), E> + Send + Sync + 'static,
    {
        let policy: ErrorPolicy<E> = Arc::new(policy);
        self.policy = Some(policy);
        self
    }

    /// Builds and returns the sequencer.
    ///
    /// This consumes the builder and initializes:
    /// - Event bus for broadcasting
    /// - Subscriber workers and their listener (if any subscribers were given)
    /// - Error policy (custom, or derived from the config's retry policy)
    pub fn build(self) -> Sequencer<T, E> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let runtime_token = CancellationToken::new();

        if !self.subscribers.is_empty() {
            SubscriberSet::new(self.subscribers, bus.clone()).listen(runtime_token.clone());
        }

        let policy = self
            .policy
            .unwrap_or_else(|| self.cfg.retry.into_error_policy());
        Sequencer::from_parts(&self.cfg, bus, policy, runtime_token)
    }
}
