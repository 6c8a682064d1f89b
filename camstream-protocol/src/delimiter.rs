//! Envelope boundary marker

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::envelope::FrameError;
use crate::header;

/// Default boundary marker
///
/// Starts and ends with a newline so a terminal attached to the link shows
/// it on its own line.
pub const DEFAULT_DELIMITER: &[u8] = b"\n12345678900STREAM00987654321\n";

/// Maximum delimiter length in bytes
pub const MAX_DELIMITER_LEN: usize = 64;

const _: () = assert!(DEFAULT_DELIMITER.len() <= MAX_DELIMITER_LEN);

/// A validated delimiter
///
/// Non-empty, at most [`MAX_DELIMITER_LEN`] bytes, and never found inside
/// the header text of an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        try_from = "Vec<u8, MAX_DELIMITER_LEN>",
        into = "Vec<u8, MAX_DELIMITER_LEN>"
    )
)]
pub struct Delimiter {
    bytes: Vec<u8, MAX_DELIMITER_LEN>,
}

impl Delimiter {
    /// Create a delimiter from raw bytes
    pub fn new(bytes: &[u8]) -> Result<Self, FrameError> {
        let bytes = Vec::from_slice(bytes).map_err(|_| FrameError::DelimiterTooLong)?;
        Self::try_from(bytes)
    }

    /// Delimiter bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Delimiter length in bytes (never zero)
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check whether the delimiter occurs anywhere in `data`
    ///
    /// A payload for which this returns true will confuse a scanning reader.
    pub fn occurs_in(&self, data: &[u8]) -> bool {
        data.windows(self.bytes.len())
            .any(|window| window == self.bytes.as_slice())
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        let mut bytes = Vec::new();
        let fits = bytes.extend_from_slice(DEFAULT_DELIMITER).is_ok();
        debug_assert!(fits);
        Self { bytes }
    }
}

impl TryFrom<Vec<u8, MAX_DELIMITER_LEN>> for Delimiter {
    type Error = FrameError;

    fn try_from(bytes: Vec<u8, MAX_DELIMITER_LEN>) -> Result<Self, Self::Error> {
        if bytes.is_empty() {
            return Err(FrameError::DelimiterEmpty);
        }
        if header::collides_with_header(&bytes) {
            return Err(FrameError::DelimiterInHeader);
        }
        Ok(Self { bytes })
    }
}

impl From<Delimiter> for Vec<u8, MAX_DELIMITER_LEN> {
    fn from(delimiter: Delimiter) -> Self {
        delimiter.bytes
    }
}

impl AsRef<[u8]> for Delimiter {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Incremental matcher that reports when the last bytes seen form the delimiter
///
/// Tracks the length of the longest delimiter prefix that is a suffix of the
/// input so far, so overlapping candidates are not lost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct DelimiterMatcher {
    matched: usize,
}

impl DelimiterMatcher {
    pub(crate) fn reset(&mut self) {
        self.matched = 0;
    }

    /// Feed one byte; returns true when a full delimiter has just been seen
    pub(crate) fn push(&mut self, delimiter: &[u8], byte: u8) -> bool {
        if self.matched == delimiter.len() {
            // Previous call completed a match; continue from its longest border
            self.matched = Self::border(delimiter, self.matched);
        }

        while self.matched > 0 && delimiter[self.matched] != byte {
            self.matched = Self::border(delimiter, self.matched);
        }
        if delimiter[self.matched] == byte {
            self.matched += 1;
        }
        self.matched == delimiter.len()
    }

    /// Longest proper prefix of `delimiter[..len]` that is also its suffix
    fn border(delimiter: &[u8], len: usize) -> usize {
        (1..len)
            .rev()
            .find(|&k| delimiter[..k] == delimiter[len - k..len])
            .unwrap_or(0)
    }
}
