//! Stream state machine definition
//!
//! One cycle is `Acquiring -> Framing -> Sending -> Acquiring`, or
//! `Acquiring -> WaitRetry -> Acquiring` when no frame was available.
//! There is no terminal state.

use super::events::StreamEvent;

/// Stream loop states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamState {
    /// Asking the frame source for the next frame
    #[default]
    Acquiring,
    /// Pausing after an empty acquisition
    WaitRetry,
    /// Holding a frame, building its envelope
    Framing,
    /// Holding a frame, writing its envelope
    Sending,
}

impl StreamState {
    /// Check if a frame is checked out of the source in this state
    pub fn holds_frame(&self) -> bool {
        matches!(self, StreamState::Framing | StreamState::Sending)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: StreamEvent) -> Self {
        use StreamEvent::*;
        use StreamState::*;

        match (self, event) {
            // Acquiring transitions
            (Acquiring, FrameAcquired) => Framing,
            (Acquiring, FrameUnavailable) => WaitRetry,

            // WaitRetry transitions
            (WaitRetry, RetryElapsed) => Acquiring,

            // Framing transitions
            (Framing, EnvelopeReady) => Sending,

            // Sending transitions (frame is released on both)
            (Sending, EnvelopeSent) => Acquiring,
            (Sending, TransportFailed) => Acquiring,

            // Default: stay in current state
            _ => self,
        }
    }
}
