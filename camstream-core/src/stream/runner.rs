//! Stream loop runner
//!
//! Drives the [`StreamState`] machine against real collaborators. Each call
//! to [`StreamLoop::step`] performs one full cycle and leaves the loop back
//! in [`StreamState::Acquiring`], whatever the outcome.

use core::convert::Infallible;

use camstream_hal::{FrameSource, UartTx};
use camstream_protocol::{Envelope, Framer};
use embedded_hal::delay::DelayNs;

use super::events::StreamEvent;
use super::machine::StreamState;
use super::stats::StreamStats;
use crate::config::StreamConfig;

/// Outcome of one loop cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cycle {
    /// A frame was framed and written completely
    Sent {
        /// Payload bytes in the envelope
        payload_len: usize,
    },
    /// No frame was available; the retry delay has been waited out
    Retried,
}

/// Errors surfaced by the stream loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamError<E> {
    /// Transport write failed; the current envelope was abandoned
    Transport(E),
}

/// Capture, frame and transmit loop
///
/// Holds exactly one frame at a time. The frame is released back to the
/// source before [`step`](Self::step) returns, on success and on transport
/// failure alike.
pub struct StreamLoop<S, T, D> {
    source: S,
    transport: T,
    delay: D,
    framer: Framer,
    retry_delay_ms: u32,
    state: StreamState,
    stats: StreamStats,
}

impl<S, T, D> StreamLoop<S, T, D>
where
    S: FrameSource,
    T: UartTx,
    D: DelayNs,
{
    /// Create a loop over already initialized collaborators
    pub fn new(source: S, transport: T, delay: D, config: &StreamConfig) -> Self {
        Self {
            source,
            transport,
            delay,
            framer: Framer::new(config.delimiter.clone()),
            retry_delay_ms: config.retry_delay_ms,
            state: StreamState::Acquiring,
            stats: StreamStats::new(),
        }
    }

    /// Run one cycle: acquire, frame and send one frame, or wait and retry
    pub fn step(&mut self) -> Result<Cycle, StreamError<T::Error>> {
        let Some(frame) = self.source.capture() else {
            self.state = self.state.transition(StreamEvent::FrameUnavailable);
            self.stats.record_retry();
            #[cfg(feature = "defmt")]
            defmt::warn!("no frame available, retrying in {} ms", self.retry_delay_ms);
            self.delay.delay_ms(self.retry_delay_ms);
            self.state = self.state.transition(StreamEvent::RetryElapsed);
            return Ok(Cycle::Retried);
        };
        self.state = self.state.transition(StreamEvent::FrameAcquired);

        let payload_len = frame.len();
        let (envelope_len, sent) = {
            let envelope = self.framer.wrap(frame.bytes());
            self.state = self.state.transition(StreamEvent::EnvelopeReady);
            (
                envelope.encoded_len(),
                send_envelope(&mut self.transport, &envelope),
            )
        };
        frame.release();

        match sent {
            Ok(()) => {
                self.state = self.state.transition(StreamEvent::EnvelopeSent);
                self.stats.record_sent(payload_len, envelope_len);
                #[cfg(feature = "defmt")]
                defmt::trace!("sent frame: {} payload bytes", payload_len);
                Ok(Cycle::Sent { payload_len })
            }
            Err(e) => {
                self.state = self.state.transition(StreamEvent::TransportFailed);
                self.stats.record_transport_failure();
                #[cfg(feature = "defmt")]
                defmt::error!(
                    "transport write failed, dropped envelope of {} bytes",
                    envelope_len
                );
                Err(StreamError::Transport(e))
            }
        }
    }

    /// Stream until the transport fails
    pub fn run(&mut self) -> Result<Infallible, StreamError<T::Error>> {
        loop {
            self.step()?;
        }
    }

    /// Stream until `stop` returns true
    ///
    /// `stop` is checked before each cycle, never while a frame is held.
    /// On stop the transport is flushed.
    pub fn run_until<F>(&mut self, mut stop: F) -> Result<(), StreamError<T::Error>>
    where
        F: FnMut(&StreamStats) -> bool,
    {
        while !stop(&self.stats) {
            self.step()?;
        }

        #[cfg(feature = "defmt")]
        defmt::info!("stream stopped after {} frames", self.stats.frames_sent);
        self.transport.flush().map_err(StreamError::Transport)
    }

    /// Current state
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Counters since creation or the last reset
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Clear the counters
    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Envelope builder in use
    pub fn framer(&self) -> &Framer {
        &self.framer
    }

    /// Frame source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Take the collaborators back
    pub fn into_parts(self) -> (S, T, D) {
        (self.source, self.transport, self.delay)
    }
}

/// Write an envelope in wire order, stopping at the first failed write
fn send_envelope<T: UartTx>(
    transport: &mut T,
    envelope: &Envelope<'_>,
) -> Result<(), T::Error> {
    for part in envelope.parts() {
        if part.is_empty() {
            continue;
        }
        transport.write_blocking(part)?;
    }
    Ok(())
}
