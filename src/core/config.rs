//! # Sequencer configuration.
//!
//! Provides [`SequencerConfig`], the settings a [`Sequencer`](crate::Sequencer) is built from.
//!
//! Config is used in two ways:
//! 1. **Sequencer creation**: `Sequencer::new(config)` / `Sequencer::builder(config)`
//! 2. **Default error handling**: `retry` becomes the initial error policy unless
//!    the builder is given a custom one.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`bus_capacity_clamped`](SequencerConfig::bus_capacity_clamped)

use crate::core::state::SequencerState;
use crate::policies::RetryPolicy;

/// Settings for one sequencer instance.
///
/// ## Field semantics
/// - `start_paused`: whether the sequencer starts paused (jobs queue up until `run()`)
/// - `drive_on_submit`: whether `submit` starts processing when the sequencer is ready
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `retry`: initial error policy, replaceable at runtime
#[derive(Clone, Debug)]
pub struct SequencerConfig {
    /// Start in the paused state.
    ///
    /// A paused sequencer accepts submissions but does not start them until
    /// [`run`](crate::Sequencer::run) is called.
    pub start_paused: bool,

    /// Start a drive cycle from `submit` when the sequencer is ready and idle.
    ///
    /// When `false`, work only starts from `run()`.
    pub drive_on_submit: bool,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` messages receive
    /// `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Initial retry behaviour for failed jobs.
    pub retry: RetryPolicy,
}

impl SequencerConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// State a freshly built sequencer starts in.
    #[inline]
    pub fn initial_state(&self) -> SequencerState {
        if self.start_paused {
            SequencerState::Paused
        } else {
            SequencerState::Ready
        }
    }
}

impl Default for SequencerConfig {
    /// Default configuration:
    ///
    /// - `start_paused = true` (nothing runs before the first `run()`)
    /// - `drive_on_submit = false`
    /// - `bus_capacity = 1024`
    /// - `retry = RetryPolicy::Never` (the first failure rejects the job)
    fn default() -> Self {
        Self {
            start_paused: true,
            drive_on_submit: false,
            bus_capacity: 1024,
            retry: RetryPolicy::Never,
        }
    }
}
