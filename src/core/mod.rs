//! Runtime core: sequencing and lifecycle.
//!
//! The public API from this module is [`Sequencer`] with its builder, config
//! and state types.
//!
//! Internal modules:
//! - [`sequencer`]: control operations and the drive loop;
//! - [`runner`]: executes one attempt of the head job and publishes `JobStarting`;
//! - [`job`]: queued job with its exactly-once settlement slot;
//! - [`state`]: paused/processing state machine;
//! - [`builder`]: wires the bus, subscribers and error policy together;
//! - [`config`]: sequencer settings.

mod builder;
mod config;
mod job;
mod runner;
mod sequencer;
mod state;

pub use builder::SequencerBuilder;
pub use config::SequencerConfig;
pub use sequencer::Sequencer;
pub use state::SequencerState;
