//! Envelope construction
//!
//! Envelope layout:
//! - DELIM: leading boundary marker
//! - HEADER: `Content-Type` and `Content-Length` lines, blank line
//! - DELIM: end of header
//! - PAYLOAD: the image bytes, unmodified
//! - DELIM: trailing boundary marker
//!
//! Everything before the payload is built into a small fixed buffer; the
//! payload itself is borrowed, never copied.

use core::fmt;

use heapless::Vec;

use crate::delimiter::{Delimiter, MAX_DELIMITER_LEN};
use crate::header::{self, MAX_HEADER_LEN, MAX_HEADER_TEXT_LEN};

/// Capacity of the part of an envelope that precedes the payload
pub const MAX_ENVELOPE_HEAD_LEN: usize = 2 * MAX_DELIMITER_LEN + MAX_HEADER_LEN;

const _: () = assert!(2 * MAX_DELIMITER_LEN + MAX_HEADER_TEXT_LEN <= MAX_ENVELOPE_HEAD_LEN);

/// Errors that can occur while configuring or encoding envelopes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Delimiter has no bytes
    DelimiterEmpty,
    /// Delimiter exceeds the maximum length
    DelimiterTooLong,
    /// Delimiter can appear inside the header text
    DelimiterInHeader,
    /// Buffer too small for encoding
    BufferTooSmall,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::DelimiterEmpty => f.write_str("delimiter is empty"),
            FrameError::DelimiterTooLong => f.write_str("delimiter too long"),
            FrameError::DelimiterInHeader => f.write_str("delimiter occurs in header text"),
            FrameError::BufferTooSmall => f.write_str("buffer too small for envelope"),
        }
    }
}

/// Wraps payloads into envelopes using a fixed delimiter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Framer {
    delimiter: Delimiter,
}

impl Framer {
    /// Create a framer for the given delimiter
    pub fn new(delimiter: Delimiter) -> Self {
        Self { delimiter }
    }

    /// The delimiter this framer emits
    pub fn delimiter(&self) -> &Delimiter {
        &self.delimiter
    }

    /// Wrap a payload into an envelope
    ///
    /// Pure: the same payload always yields the same bytes, and the payload
    /// is only borrowed.
    pub fn wrap<'a>(&'a self, payload: &'a [u8]) -> Envelope<'a> {
        let delim = self.delimiter.as_bytes();
        let mut head = Vec::new();
        // Capacity covers two maximum-length delimiters plus the longest
        // header text (checked at compile time above).
        let fits = head.extend_from_slice(delim).is_ok()
            && header::write_header(&mut head, payload.len()).is_ok()
            && head.extend_from_slice(delim).is_ok();
        debug_assert!(fits, "envelope head truncated");

        Envelope {
            head,
            payload,
            trailer: delim,
        }
    }
}

/// One framed payload, ready to be written in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<'a> {
    head: Vec<u8, MAX_ENVELOPE_HEAD_LEN>,
    payload: &'a [u8],
    trailer: &'a [u8],
}

impl<'a> Envelope<'a> {
    /// Leading delimiter, header text and second delimiter
    pub fn header(&self) -> &[u8] {
        &self.head
    }

    /// Payload bytes, exactly as given to [`Framer::wrap`]
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Trailing delimiter
    pub fn trailer(&self) -> &'a [u8] {
        self.trailer
    }

    /// The three byte ranges in wire order
    pub fn parts(&self) -> [&[u8]; 3] {
        [self.header(), self.payload, self.trailer]
    }

    /// Total encoded size in bytes
    pub fn encoded_len(&self) -> usize {
        self.head.len() + self.payload.len() + self.trailer.len()
    }

    /// Encode the whole envelope into one contiguous buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let total = self.encoded_len();
        if buffer.len() < total {
            return Err(FrameError::BufferTooSmall);
        }

        let mut pos = 0;
        for part in self.parts() {
            buffer[pos..pos + part.len()].copy_from_slice(part);
            pos += part.len();
        }
        Ok(total)
    }
}
