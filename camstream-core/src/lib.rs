//! Board-agnostic core logic for the camstream firmware
//!
//! This crate contains the application logic that does not depend on a
//! specific camera driver or serial peripheral:
//!
//! - The capture, frame and transmit loop and its state machine
//! - Stream statistics
//! - Configuration types, board descriptors and the config file parser

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod stream;

pub use config::StreamConfig;
pub use stream::{Cycle, StreamError, StreamEvent, StreamLoop, StreamState, StreamStats};
