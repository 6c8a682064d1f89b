//! Envelope header text
//!
//! The header is HTTP-style ASCII: one `Name: value` pair per line, lines
//! ending in CRLF, terminated by an empty line.

use heapless::{String, Vec};

use crate::envelope::FrameError;

/// Content type announced for every payload
pub const CONTENT_TYPE: &str = "image/jpeg";

/// Maximum header text length accepted between two delimiters
pub const MAX_HEADER_LEN: usize = 128;

/// Maximum length of a content type value kept by the parser
pub const MAX_CONTENT_TYPE_LEN: usize = 32;

const CONTENT_TYPE_PREFIX: &[u8] = b"Content-Type: ";
const CONTENT_LENGTH_PREFIX: &[u8] = b"\r\nContent-Length: ";
const HEADER_END: &[u8] = b"\r\n\r\n";

/// Header text that precedes the length digits
const HEADER_BEFORE_LENGTH: &[u8] = b"Content-Type: image/jpeg\r\nContent-Length: ";

/// Longest decimal rendering of a `usize`
const MAX_DECIMAL_DIGITS: usize = 20;

/// Longest header text [`write_header`] can produce
pub const MAX_HEADER_TEXT_LEN: usize = CONTENT_TYPE_PREFIX.len()
    + CONTENT_TYPE.len()
    + CONTENT_LENGTH_PREFIX.len()
    + MAX_DECIMAL_DIGITS
    + HEADER_END.len();

const _: () = assert!(MAX_HEADER_TEXT_LEN <= MAX_HEADER_LEN);

/// Parsed header fields
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EnvelopeHeader {
    /// Exact payload length in bytes
    pub content_length: usize,
    /// Announced content type (empty if the header carried none)
    pub content_type: String<MAX_CONTENT_TYPE_LEN>,
}

/// Append the header text for a payload of `len` bytes
///
/// Writes `Content-Type: image/jpeg\r\nContent-Length: <len>\r\n\r\n`.
/// Fails only if `out` lacks room.
pub fn write_header<const N: usize>(
    out: &mut Vec<u8, N>,
    len: usize,
) -> Result<(), FrameError> {
    let mut digits = [0u8; MAX_DECIMAL_DIGITS];
    let result = [
        CONTENT_TYPE_PREFIX,
        CONTENT_TYPE.as_bytes(),
        CONTENT_LENGTH_PREFIX,
        format_decimal(len, &mut digits),
        HEADER_END,
    ]
    .into_iter()
    .try_for_each(|part| out.extend_from_slice(part))
    .map_err(|_| FrameError::BufferTooSmall);
    result
}

/// Check whether `delimiter` can show up inside the header text
///
/// Covers the fixed text, any run of length digits, and a delimiter that
/// overlaps either end of the header. A reader scanning for such a
/// delimiter would split the header and never find the payload.
pub(crate) fn collides_with_header(delimiter: &[u8]) -> bool {
    let n = delimiter.len();
    if contains(HEADER_BEFORE_LENGTH, delimiter) || contains(HEADER_END, delimiter) {
        return true;
    }

    // Tail of the fixed prefix, then length digits, then start of HEADER_END
    for i in 0..=n {
        if !HEADER_BEFORE_LENGTH.ends_with(&delimiter[..i]) {
            continue;
        }
        let run = delimiter[i..].iter().take_while(|b| b.is_ascii_digit()).count();
        for j in i..=(i + run).min(i + MAX_DECIMAL_DIGITS) {
            // At least one digit always separates the prefix from HEADER_END
            if i > 0 && j == i && j < n {
                continue;
            }
            if HEADER_END.starts_with(&delimiter[j..]) {
                return true;
            }
        }
    }

    (1..n).any(|k| {
        delimiter[k..] == delimiter[..n - k]
            && (HEADER_BEFORE_LENGTH.starts_with(&delimiter[n - k..])
                || HEADER_END.ends_with(&delimiter[..k]))
    })
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}

/// Header text length for a payload of `len` bytes
pub fn header_len(len: usize) -> usize {
    let mut digits = [0u8; MAX_DECIMAL_DIGITS];
    CONTENT_TYPE_PREFIX.len()
        + CONTENT_TYPE.len()
        + CONTENT_LENGTH_PREFIX.len()
        + format_decimal(len, &mut digits).len()
        + HEADER_END.len()
}

/// Render `value` as ASCII decimal into the tail of `buf`
fn format_decimal(mut value: usize, buf: &mut [u8; MAX_DECIMAL_DIGITS]) -> &[u8] {
    let mut pos = buf.len();
    loop {
        pos -= 1;
        buf[pos] = b'0' + (value % 10) as u8;
        value /= 10;
        if value == 0 {
            break;
        }
    }
    &buf[pos..]
}

/// Parse header text into its fields
///
/// Field names are matched case-insensitively and surrounding whitespace is
/// ignored. Returns `None` if there is no well-formed `Content-Length`.
pub fn parse_header(text: &[u8]) -> Option<EnvelopeHeader> {
    let mut content_length = None;
    let mut content_type = String::new();

    for line in text.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let Some(colon) = line.iter().position(|&b| b == b':') else {
            continue;
        };
        let name = line[..colon].trim_ascii();
        let value = line[colon + 1..].trim_ascii();

        if name.eq_ignore_ascii_case(b"content-length") {
            content_length = Some(parse_decimal(value)?);
        } else if name.eq_ignore_ascii_case(b"content-type") {
            content_type.clear();
            if let Ok(value) = core::str::from_utf8(value) {
                // Over-long types are kept truncated rather than rejected
                for c in value.chars() {
                    if content_type.push(c).is_err() {
                        break;
                    }
                }
            }
        }
    }

    Some(EnvelopeHeader {
        content_length: content_length?,
        content_type,
    })
}

fn parse_decimal(digits: &[u8]) -> Option<usize> {
    if digits.is_empty() {
        return None;
    }
    digits.iter().try_fold(0usize, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add((b - b'0') as usize)
    })
}
