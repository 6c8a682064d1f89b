//! Driver implementations
//!
//! Concrete implementations of the traits defined in camstream-hal:
//!
//! - Transports over any `embedded-io` writer
//! - Frame sources (fixed frame replay for link bring-up)

#![no_std]
#![deny(unsafe_code)]

pub mod source;
pub mod transport;

pub use source::{ReplayFrame, ReplaySource};
pub use transport::IoTransport;
