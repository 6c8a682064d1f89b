//! Transport over an `embedded-io` writer
//!
//! Any blocking serial writer that implements [`embedded_io::Write`] (HAL
//! UART drivers, USB CDC classes, a buffer in tests) becomes a stream
//! transport.

use camstream_hal::UartTx;
use embedded_io::Write;

/// [`UartTx`] adapter for an [`embedded_io::Write`] implementation
pub struct IoTransport<W> {
    writer: W,
    bytes_written: u64,
}

impl<W: Write> IoTransport<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            bytes_written: 0,
        }
    }

    /// Bytes accepted by the writer so far
    ///
    /// Only counts completed writes; a write that failed part-way is not
    /// included.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Get a reference to the underlying writer
    pub fn inner(&self) -> &W {
        &self.writer
    }

    /// Take the writer back
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> UartTx for IoTransport<W> {
    type Error = W::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.writer.write_all(data)?;
        self.bytes_written += data.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.writer.flush()
    }
}
