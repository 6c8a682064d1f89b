//! camstream Hardware Abstraction Layer
//!
//! This crate defines the two hardware seams the streaming core needs: a
//! camera that hands out compressed frame buffers, and a serial transmitter
//! that writes bytes to the wire. Board crates implement these traits for
//! their sensor driver and UART peripheral; the streaming loop in
//! `camstream-core` only ever sees the traits.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  camstream-core (StreamLoop)            │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  camstream-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ camera driver │       │  UART driver  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`camera::FrameSource`] - Frame buffer acquisition and release
//! - [`uart::UartTx`] - Serial transmission

#![no_std]
#![deny(unsafe_code)]

pub mod camera;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use camera::{FrameGuard, FrameSource};
pub use uart::{UartConfig, UartTx};
