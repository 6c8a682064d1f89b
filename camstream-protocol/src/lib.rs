//! camstream Serial Envelope Protocol
//!
//! This crate defines how a compressed image is wrapped for transmission over
//! a byte-oriented serial link, and how a reader that joins the stream at an
//! arbitrary point finds the image boundaries again.
//!
//! # Protocol Overview
//!
//! Every image is sent as one envelope:
//! ```text
//! ┌───────┬──────────────────────────────┬───────┬──────────────┬───────┐
//! │ DELIM │ Content-Type: image/jpeg\r\n │ DELIM │ PAYLOAD      │ DELIM │
//! │       │ Content-Length: <N>\r\n\r\n  │       │ exactly N B  │       │
//! └───────┴──────────────────────────────┴───────┴──────────────┴───────┘
//! ```
//!
//! Envelopes follow each other with no gap, so one envelope's trailing
//! delimiter is immediately followed by the next envelope's leading one.
//! Payload bytes are sent verbatim. The delimiter is not escaped inside the
//! payload; it is chosen to be unlikely in JPEG data and a reader that hits
//! a false match resynchronizes on the next envelope.

#![no_std]
#![deny(unsafe_code)]

pub mod delimiter;
pub mod envelope;
pub mod header;
pub mod parser;

pub use delimiter::{Delimiter, DEFAULT_DELIMITER, MAX_DELIMITER_LEN};
pub use envelope::{Envelope, FrameError, Framer, MAX_ENVELOPE_HEAD_LEN};
pub use header::{parse_header, EnvelopeHeader, CONTENT_TYPE, MAX_HEADER_LEN};
pub use parser::{EnvelopeParser, ParseError};
