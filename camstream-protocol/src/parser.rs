//! Reader side of the envelope stream
//!
//! A reader may attach to the link at any point, so the parser starts by
//! hunting for a delimiter and treats whatever sits between two delimiters
//! as a candidate header. Only a candidate carrying a `Content-Length`
//! starts a payload; anything else is skipped, with the second delimiter
//! taken as the new opening one. That single rule also covers the adjacent
//! trailing/leading delimiter pair between two envelopes.

use heapless::Vec;

use crate::delimiter::{Delimiter, DelimiterMatcher, MAX_DELIMITER_LEN};
use crate::header::{parse_header, MAX_HEADER_LEN};

/// Errors reported while scanning the stream
///
/// Each error is followed by an automatic resynchronization on the next
/// delimiter; the parser never needs a manual reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// No delimiter within [`MAX_HEADER_LEN`] bytes of an opening delimiter
    HeaderTooLong,
    /// Header text between two delimiters had no valid `Content-Length`
    MissingContentLength,
    /// Declared payload does not fit the parser's buffer
    PayloadTooLarge,
    /// Payload was not followed by a delimiter
    MissingTrailer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Looking for an opening delimiter
    Hunting,
    /// Collecting header text up to the next delimiter
    Header,
    /// Copying payload bytes; value is bytes still expected
    Payload(usize),
    /// Matching the trailing delimiter; value is bytes matched so far
    Trailer(usize),
}

/// Streaming envelope parser with an `N`-byte payload buffer
pub struct EnvelopeParser<const N: usize> {
    delimiter: Delimiter,
    state: ParseState,
    matcher: DelimiterMatcher,
    header: Vec<u8, { MAX_HEADER_LEN + MAX_DELIMITER_LEN }>,
    payload: Vec<u8, N>,
    images: u32,
}

impl<const N: usize> EnvelopeParser<N> {
    /// Create a parser that scans for `delimiter`
    pub fn new(delimiter: Delimiter) -> Self {
        Self {
            delimiter,
            state: ParseState::Hunting,
            matcher: DelimiterMatcher::default(),
            header: Vec::new(),
            payload: Vec::new(),
            images: 0,
        }
    }

    /// Drop any partial envelope and hunt for the next delimiter
    pub fn reset(&mut self) {
        self.state = ParseState::Hunting;
        self.matcher.reset();
        self.header.clear();
        self.payload.clear();
    }

    /// Number of complete images parsed so far
    pub fn images(&self) -> u32 {
        self.images
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(payload))` when an envelope has been completed,
    /// `Ok(None)` when more bytes are needed, or `Err` when the current
    /// candidate envelope was abandoned.
    pub fn feed(&mut self, byte: u8) -> Result<Option<&[u8]>, ParseError> {
        match self.state {
            ParseState::Hunting => {
                if self.matcher.push(self.delimiter.as_bytes(), byte) {
                    self.start_header();
                }
                Ok(None)
            }
            ParseState::Header => {
                if self.header.push(byte).is_err() {
                    self.resync(byte);
                    return Err(ParseError::HeaderTooLong);
                }
                if !self.matcher.push(self.delimiter.as_bytes(), byte) {
                    if self.header.len() > MAX_HEADER_LEN + self.delimiter.len() {
                        self.resync(byte);
                        return Err(ParseError::HeaderTooLong);
                    }
                    return Ok(None);
                }
                self.finish_header()
            }
            ParseState::Payload(remaining) => {
                // Capacity was checked against the declared length
                let _ = self.payload.push(byte);
                if remaining == 1 {
                    self.state = ParseState::Trailer(0);
                } else {
                    self.state = ParseState::Payload(remaining - 1);
                }
                Ok(None)
            }
            ParseState::Trailer(matched) => {
                if self.delimiter.as_bytes()[matched] != byte {
                    self.resync(byte);
                    return Err(ParseError::MissingTrailer);
                }
                if matched + 1 < self.delimiter.len() {
                    self.state = ParseState::Trailer(matched + 1);
                    return Ok(None);
                }
                self.state = ParseState::Hunting;
                self.matcher.reset();
                self.images = self.images.wrapping_add(1);
                Ok(Some(self.payload.as_slice()))
            }
        }
    }

    /// Feed multiple bytes, handing every completed image or error to `sink`
    ///
    /// Returns the number of images completed by this call.
    pub fn feed_bytes<F>(&mut self, bytes: &[u8], mut sink: F) -> usize
    where
        F: FnMut(Result<&[u8], ParseError>),
    {
        let mut completed = 0;
        for &byte in bytes {
            match self.feed(byte) {
                Ok(Some(image)) => {
                    completed += 1;
                    sink(Ok(image));
                }
                Ok(None) => {}
                Err(e) => sink(Err(e)),
            }
        }
        completed
    }

    fn start_header(&mut self) {
        self.state = ParseState::Header;
        self.matcher.reset();
        self.header.clear();
    }

    /// Header text is complete; decide whether it opens a payload
    fn finish_header(&mut self) -> Result<Option<&[u8]>, ParseError> {
        let text_len = self.header.len() - self.delimiter.len();
        let text = &self.header[..text_len];
        let parsed = parse_header(text);
        let was_blank = text.iter().all(u8::is_ascii_whitespace);

        let Some(parsed) = parsed else {
            // The closing delimiter becomes the next opening one
            self.start_header();
            return if was_blank {
                Ok(None)
            } else {
                Err(ParseError::MissingContentLength)
            };
        };

        if parsed.content_length > N {
            self.reset();
            return Err(ParseError::PayloadTooLarge);
        }

        self.payload.clear();
        self.matcher.reset();
        self.state = if parsed.content_length == 0 {
            ParseState::Trailer(0)
        } else {
            ParseState::Payload(parsed.content_length)
        };
        Ok(None)
    }

    /// Abandon the current envelope and hunt again, starting from `byte`
    fn resync(&mut self, byte: u8) {
        self.reset();
        if self.matcher.push(self.delimiter.as_bytes(), byte) {
            self.start_header();
        }
    }
}
