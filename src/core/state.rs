//! Control state of a sequencer.
//!
//! The paused flag and the processing flag are folded into one tagged state so
//! that impossible combinations cannot be represented:
//!
//! ```text
//!              run()                      queue non-empty
//!   Paused ───────────► Ready ─────────────────────────────► Processing
//!     ▲                   ▲                                    │   ▲
//!     │ cycle ends        │ cycle ends                 pause() │   │ run()
//!     │                   └────────────────────────────────────┤   │
//!     └──────────────────────────────────────────────────── Pausing
//! ```

/// Where a sequencer is in its pause/processing lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    /// Paused and idle; submissions queue up.
    Paused,
    /// Not paused and idle; the next `run()` (or submit, if enabled) starts a cycle.
    Ready,
    /// A drive cycle is executing jobs.
    Processing,
    /// A drive cycle is finishing its current job and will then stop.
    Pausing,
}

impl SequencerState {
    /// True if the paused flag is set.
    #[inline]
    pub fn is_paused(self) -> bool {
        matches!(self, Self::Paused | Self::Pausing)
    }

    /// True while a drive cycle is active.
    #[inline]
    pub fn is_processing(self) -> bool {
        matches!(self, Self::Processing | Self::Pausing)
    }

    pub(crate) fn paused(self) -> Self {
        match self {
            Self::Ready => Self::Paused,
            Self::Processing => Self::Pausing,
            other => other,
        }
    }

    pub(crate) fn resumed(self) -> Self {
        match self {
            Self::Paused => Self::Ready,
            Self::Pausing => Self::Processing,
            other => other,
        }
    }

    /// State after the drive cycle exits.
    pub(crate) fn settled(self) -> Self {
        match self {
            Self::Processing => Self::Ready,
            Self::Pausing => Self::Paused,
            other => other,
        }
    }
}
