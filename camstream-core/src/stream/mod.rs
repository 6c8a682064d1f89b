//! Capture, frame and transmit loop
//!
//! The loop is an explicit, finite state machine driven one cycle at a
//! time. Collaborators (frame source, transport, delay) are injected so the
//! loop runs the same way on hardware and against fakes.

pub mod events;
pub mod machine;
pub mod runner;
pub mod stats;

pub use events::StreamEvent;
pub use machine::StreamState;
pub use runner::{Cycle, StreamError, StreamLoop};
pub use stats::StreamStats;
