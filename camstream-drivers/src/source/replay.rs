//! Replay frame source
//!
//! Hands out a fixed set of frames in a loop. Used to bring up and soak
//! test the serial link without a sensor attached.

use camstream_hal::FrameSource;

/// One frame handed out by [`ReplaySource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayFrame<'a> {
    index: usize,
    data: &'a [u8],
}

impl<'a> ReplayFrame<'a> {
    /// Position of this frame in the replay set
    pub fn index(&self) -> usize {
        self.index
    }

    /// Frame bytes
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

impl AsRef<[u8]> for ReplayFrame<'_> {
    fn as_ref(&self) -> &[u8] {
        self.data
    }
}

/// Frame source that cycles through a fixed set of frames
///
/// Only one frame can be out at a time: `acquire` reports no frame until
/// the previous one has been released.
#[derive(Debug, Clone)]
pub struct ReplaySource<'a> {
    frames: &'a [&'a [u8]],
    next: usize,
    in_flight: Option<usize>,
    /// Every Nth acquire reports no frame (0 = never)
    empty_every: u32,
    calls: u32,
    acquired: u32,
    released: u32,
}

impl<'a> ReplaySource<'a> {
    /// Create a source over `frames`
    pub fn new(frames: &'a [&'a [u8]]) -> Self {
        Self {
            frames,
            next: 0,
            in_flight: None,
            empty_every: 0,
            calls: 0,
            acquired: 0,
            released: 0,
        }
    }

    /// Report no frame on every `n`th acquire
    pub fn with_empty_every(mut self, n: u32) -> Self {
        self.empty_every = n;
        self
    }

    /// Frames handed out so far
    pub fn acquired(&self) -> u32 {
        self.acquired
    }

    /// Frames returned so far
    pub fn released(&self) -> u32 {
        self.released
    }

    /// Check if a frame is currently handed out
    pub fn in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}

impl<'a> FrameSource for ReplaySource<'a> {
    type Frame = ReplayFrame<'a>;

    fn acquire(&mut self) -> Option<ReplayFrame<'a>> {
        if self.in_flight.is_some() || self.frames.is_empty() {
            return None;
        }

        self.calls = self.calls.wrapping_add(1);
        if self.empty_every != 0 && self.calls % self.empty_every == 0 {
            return None;
        }

        let index = self.next;
        self.next = (self.next + 1) % self.frames.len();
        self.in_flight = Some(index);
        self.acquired = self.acquired.saturating_add(1);

        Some(ReplayFrame {
            index,
            data: self.frames[index],
        })
    }

    fn release(&mut self, frame: ReplayFrame<'a>) {
        if self.in_flight != Some(frame.index) {
            #[cfg(feature = "defmt")]
            defmt::warn!("release of frame {} that is not in flight", frame.index);
            return;
        }
        self.in_flight = None;
        self.released = self.released.saturating_add(1);
    }
}
