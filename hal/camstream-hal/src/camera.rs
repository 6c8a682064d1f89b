//! Camera frame buffer abstractions
//!
//! A camera driver owns a small pool of frame buffers. The application
//! borrows one at a time with [`FrameSource::acquire`] and must hand it back
//! with [`FrameSource::release`] exactly once, whatever happens in between.
//! [`FrameSource::capture`] wraps that pair in a [`FrameGuard`] so the
//! release happens on every exit path.

use core::ops::Deref;

/// Source of compressed image frames
pub trait FrameSource {
    /// Handle to one captured frame buffer
    ///
    /// Dereferences to the compressed image bytes.
    type Frame: AsRef<[u8]>;

    /// Take the next available frame buffer
    ///
    /// Returns `None` when no buffer is ready. That condition is transient;
    /// callers are expected to wait and try again.
    fn acquire(&mut self) -> Option<Self::Frame>;

    /// Return a frame buffer previously obtained from [`acquire`](Self::acquire)
    fn release(&mut self, frame: Self::Frame);

    /// Acquire a frame wrapped in a guard that releases it on drop
    ///
    /// The guard holds `&mut self`, so no second frame can be acquired
    /// while the first is still in flight.
    fn capture(&mut self) -> Option<FrameGuard<'_, Self>>
    where
        Self: Sized,
    {
        let frame = self.acquire()?;
        Some(FrameGuard {
            source: self,
            frame: Some(frame),
        })
    }
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    type Frame = S::Frame;

    fn acquire(&mut self) -> Option<Self::Frame> {
        S::acquire(self)
    }

    fn release(&mut self, frame: Self::Frame) {
        S::release(self, frame)
    }
}

/// Scoped ownership of one acquired frame
///
/// Releases the frame back to its source when dropped.
pub struct FrameGuard<'s, S: FrameSource> {
    source: &'s mut S,
    frame: Option<S::Frame>,
}

impl<S: FrameSource> FrameGuard<'_, S> {
    /// Compressed image bytes
    pub fn bytes(&self) -> &[u8] {
        match &self.frame {
            Some(frame) => frame.as_ref(),
            None => &[],
        }
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    /// Check if the frame carries no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }

    /// Release the frame now instead of at end of scope
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(frame) = self.frame.take() {
            self.source.release(frame);
        }
    }
}

impl<S: FrameSource> Deref for FrameGuard<'_, S> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.bytes()
    }
}

impl<S: FrameSource> Drop for FrameGuard<'_, S> {
    fn drop(&mut self) {
        self.release_inner();
    }
}
