//! Events that move the stream loop between states

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamEvent {
    // Acquisition events
    /// Frame source handed out a frame
    FrameAcquired,
    /// Frame source had no frame ready
    FrameUnavailable,
    /// Retry delay has passed
    RetryElapsed,

    // Transmission events
    /// Envelope header and delimiters are built
    EnvelopeReady,
    /// Whole envelope written to the transport
    EnvelopeSent,
    /// Transport reported a write failure; rest of the envelope dropped
    TransportFailed,
}
